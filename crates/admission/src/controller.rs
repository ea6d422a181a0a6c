// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission controller: strategy selection, stats, guarded calls.

use crate::config::{AdmissionConfig, AdmissionMode};
use crate::counter::CounterStore;
use crate::distributed::DistributedStrategy;
use crate::error::{AdmissionError, CallError};
use crate::guarded::GuardedStream;
use crate::local::LocalStrategy;
use crate::slot::{Permit, Slot};
use crate::stats::{CallStats, StatsSnapshot};
use async_trait::async_trait;
use futures_util::stream::Stream;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A way of bounding concurrent upstream calls.
#[async_trait]
pub trait AdmissionStrategy: Send + Sync + 'static {
    /// Wait up to `timeout` for capacity.
    async fn acquire(&self, timeout: Duration) -> Result<Permit, AdmissionError>;

    fn mode(&self) -> AdmissionMode;

    fn limit(&self) -> usize;

    /// Calls currently holding capacity across all processes, when known.
    async fn in_flight(&self) -> Option<i64> {
        None
    }
}

/// Gatekeeper every upstream model call goes through.
#[derive(Clone)]
pub struct AdmissionController {
    strategy: Arc<dyn AdmissionStrategy>,
    stats: Arc<CallStats>,
    timeout: Duration,
}

impl AdmissionController {
    pub fn new(strategy: Arc<dyn AdmissionStrategy>, timeout: Duration) -> Self {
        Self { strategy, stats: Arc::new(CallStats::new()), timeout }
    }

    pub fn local(config: &AdmissionConfig) -> Self {
        Self::new(Arc::new(LocalStrategy::new(config.local_limit)), config.acquire_timeout())
    }

    pub fn distributed(config: &AdmissionConfig, store: Arc<dyn CounterStore>) -> Self {
        Self::new(Arc::new(DistributedStrategy::new(store, config)), config.acquire_timeout())
    }

    /// Build the strategy named by `config.mode`.
    ///
    /// Distributed mode without a counter store falls back to the local
    /// semaphore, which only bounds this process.
    pub fn from_config(config: &AdmissionConfig, store: Option<Arc<dyn CounterStore>>) -> Self {
        match (config.mode, store) {
            (AdmissionMode::Distributed, Some(store)) => {
                tracing::info!(
                    global_limit = config.global_limit,
                    key = %config.counter_key,
                    "admission: distributed counter"
                );
                Self::distributed(config, store)
            }
            (AdmissionMode::Distributed, None) => {
                tracing::warn!(
                    local_limit = config.local_limit,
                    "admission: no counter store configured, using process-local limit only"
                );
                Self::local(config)
            }
            (AdmissionMode::Local, _) => {
                tracing::info!(local_limit = config.local_limit, "admission: process-local semaphore");
                Self::local(config)
            }
        }
    }

    pub fn mode(&self) -> AdmissionMode {
        self.strategy.mode()
    }

    pub fn limit(&self) -> usize {
        self.strategy.limit()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Best-effort read of the cluster-wide in-flight count.
    pub async fn global_in_flight(&self) -> Option<i64> {
        self.strategy.in_flight().await
    }

    /// Acquire a slot with the configured timeout.
    pub async fn acquire(&self) -> Result<Slot, AdmissionError> {
        self.acquire_timeout(self.timeout).await
    }

    pub async fn acquire_timeout(&self, timeout: Duration) -> Result<Slot, AdmissionError> {
        let started = Instant::now();
        match self.strategy.acquire(timeout).await {
            Ok(permit) => {
                self.stats.record_acquired(started.elapsed(), permit.is_fail_open());
                Ok(Slot::new(permit, Arc::clone(&self.stats)))
            }
            Err(e) => {
                self.stats.record_rejected(started.elapsed());
                tracing::warn!(limit = self.limit(), mode = %self.mode(), "{e}");
                Err(e)
            }
        }
    }

    pub async fn release(&self, slot: Slot) {
        slot.release().await;
    }

    /// Run one upstream call while holding a slot.
    ///
    /// The slot is released whether the call succeeds, fails, or the
    /// returned future is dropped mid-flight.
    pub async fn call<F, T, E>(&self, call: F) -> Result<T, CallError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        let slot = self.acquire().await.map_err(CallError::Admission)?;
        let result = call.await;
        slot.release().await;
        result.map_err(CallError::Upstream)
    }

    /// Open a streaming upstream call and hold a slot for the stream's life.
    ///
    /// The slot is released when the stream is exhausted, yields its first
    /// error, or is dropped; never on the first chunk.
    pub async fn call_stream<O, Fut, S, T, E>(
        &self,
        open: O,
    ) -> Result<GuardedStream<S>, CallError<E>>
    where
        O: FnOnce() -> Fut,
        Fut: Future<Output = Result<S, E>>,
        S: Stream<Item = Result<T, E>> + Unpin,
    {
        let slot = self.acquire().await.map_err(CallError::Admission)?;
        match open().await {
            Ok(stream) => Ok(GuardedStream::new(stream, slot)),
            Err(e) => {
                slot.release().await;
                Err(CallError::Upstream(e))
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
