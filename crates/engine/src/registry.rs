// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run record bookkeeping.

use crate::cache::{running_runs_key, CacheInvalidator};
use crate::run_store::{RunStore, RunStoreError};
use sluice_core::{AccountId, Clock, Run, RunId, RunStatus, SystemClock, ThreadId};
use std::sync::Arc;

/// Creates and updates run records and keeps dependent caches fresh.
#[derive(Clone)]
pub struct RunRegistry<C: Clock = SystemClock> {
    store: Arc<dyn RunStore>,
    cache: Arc<dyn CacheInvalidator>,
    clock: C,
}

impl<C: Clock> RunRegistry<C> {
    pub fn new(store: Arc<dyn RunStore>, cache: Arc<dyn CacheInvalidator>, clock: C) -> Self {
        Self { store, cache, clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Insert a `running` record stamped with the current time.
    pub async fn create(
        &self,
        run_id: RunId,
        thread_id: ThreadId,
        metadata: impl IntoIterator<Item = (String, serde_json::Value)>,
    ) -> Result<Run, RunStoreError> {
        let mut run = Run::started(run_id, thread_id, self.clock.epoch_ms());
        run.metadata.extend(metadata);
        self.store.insert(run.clone()).await?;
        tracing::info!(run_id = %run.id, thread_id = %run.thread_id, "run record created");
        Ok(run)
    }

    pub async fn get(&self, run_id: &RunId) -> Result<Option<Run>, RunStoreError> {
        self.store.get(run_id).await
    }

    pub async fn set_status(
        &self,
        run_id: &RunId,
        status: RunStatus,
        error: Option<String>,
    ) -> Result<Run, RunStoreError> {
        let run = self.store.set_status(run_id, status, self.clock.epoch_ms(), error).await?;
        tracing::info!(run_id = %run_id, %status, "run status written");
        Ok(run)
    }

    /// Drop the requester's running-runs cache without waiting for it.
    ///
    /// Failures are logged; a stale cache only delays what the requester
    /// sees.
    pub fn invalidate_running(&self, account_id: &AccountId) {
        let cache = Arc::clone(&self.cache);
        let key = running_runs_key(account_id);
        tokio::spawn(async move {
            match cache.invalidate(&key).await {
                Ok(()) => tracing::debug!(%key, "cache invalidated"),
                Err(e) => tracing::warn!(%key, error = %e, "cache invalidation failed"),
            }
        });
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
