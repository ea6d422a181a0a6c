// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent run records.

use async_trait::async_trait;
use parking_lot::Mutex;
use sluice_core::{InvalidTransition, Run, RunId, RunStatus};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunStoreError {
    #[error("run {0} already exists")]
    Duplicate(RunId),
    #[error("run {0} not found")]
    NotFound(RunId),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error("run store unavailable: {0}")]
    Unavailable(String),
}

/// Database of run records.
///
/// At most one record exists per run ID, and status writes obey
/// [`RunStatus::can_transition_to`].
#[async_trait]
pub trait RunStore: Send + Sync + 'static {
    async fn insert(&self, run: Run) -> Result<(), RunStoreError>;

    async fn get(&self, id: &RunId) -> Result<Option<Run>, RunStoreError>;

    /// Write a status and return the updated record.
    async fn set_status(
        &self,
        id: &RunId,
        status: RunStatus,
        at_ms: u64,
        error: Option<String>,
    ) -> Result<Run, RunStoreError>;
}

#[derive(Default)]
struct State {
    runs: HashMap<RunId, Run>,
    unavailable: bool,
}

/// In-process [`RunStore`] shared by clones.
#[derive(Clone, Default)]
pub struct MemoryRunStore {
    inner: Arc<Mutex<State>>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored run, in no particular order.
    pub fn runs(&self) -> Vec<Run> {
        self.inner.lock().runs.values().cloned().collect()
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unavailable = unavailable;
    }
}

fn check(state: &State) -> Result<(), RunStoreError> {
    if state.unavailable {
        return Err(RunStoreError::Unavailable("memory run store offline".to_string()));
    }
    Ok(())
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn insert(&self, run: Run) -> Result<(), RunStoreError> {
        let mut state = self.inner.lock();
        check(&state)?;
        if state.runs.contains_key(&run.id) {
            return Err(RunStoreError::Duplicate(run.id));
        }
        state.runs.insert(run.id.clone(), run);
        Ok(())
    }

    async fn get(&self, id: &RunId) -> Result<Option<Run>, RunStoreError> {
        let state = self.inner.lock();
        check(&state)?;
        Ok(state.runs.get(id).cloned())
    }

    async fn set_status(
        &self,
        id: &RunId,
        status: RunStatus,
        at_ms: u64,
        error: Option<String>,
    ) -> Result<Run, RunStoreError> {
        let mut state = self.inner.lock();
        check(&state)?;
        let run = state.runs.get_mut(id).ok_or_else(|| RunStoreError::NotFound(id.clone()))?;
        run.transition(status, at_ms, error)?;
        Ok(run.clone())
    }
}

#[cfg(test)]
#[path = "run_store_tests.rs"]
mod tests;
