// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::queue::QueueError;
use crate::resolver::ResolveError;
use crate::run_store::RunStoreError;
use sluice_core::RunId;
use sluice_stream::StoreError;
use thiserror::Error;

/// Why a run could not be started.
///
/// `Config` and `RunRecord` leave nothing behind. `Channel` and `Enqueue`
/// happen after the run record exists; by the time they are returned the
/// record has been marked `failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("failed to resolve job config: {0}")]
    Config(#[from] ResolveError),
    #[error("failed to create run record: {0}")]
    RunRecord(#[from] RunStoreError),
    #[error("failed to create stream channel: {0}")]
    Channel(#[from] StoreError),
    #[error("failed to enqueue run: {0}")]
    Enqueue(#[from] QueueError),
}

impl DispatchError {
    /// Whether a run record exists (in `failed` state) for this attempt.
    pub fn left_failed_record(&self) -> bool {
        matches!(self, DispatchError::Channel(_) | DispatchError::Enqueue(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StopError {
    #[error("run {0} not found")]
    NotFound(RunId),
    #[error(transparent)]
    Store(#[from] RunStoreError),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
