// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::job::RunJob;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("enqueue rejected: {0}")]
    Rejected(String),
}

/// Worker queue. Success means the message was accepted, nothing more.
#[async_trait]
pub trait JobQueue: Send + Sync + 'static {
    async fn enqueue(&self, job: RunJob) -> Result<(), QueueError>;
}

#[derive(Default)]
struct State {
    jobs: VecDeque<RunJob>,
    failing: Option<String>,
}

/// In-process FIFO [`JobQueue`] shared by clones.
#[derive(Clone, Default)]
pub struct MemoryJobQueue {
    inner: Arc<Mutex<State>>,
}

impl MemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest queued job.
    pub fn pop(&self) -> Option<RunJob> {
        self.inner.lock().jobs.pop_front()
    }

    pub fn jobs(&self) -> Vec<RunJob> {
        self.inner.lock().jobs.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject every enqueue with `reason` until cleared with `None`.
    #[cfg(any(test, feature = "test-support"))]
    pub fn set_failing(&self, reason: Option<&str>) {
        self.inner.lock().failing = reason.map(str::to_string);
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn enqueue(&self, job: RunJob) -> Result<(), QueueError> {
        let mut state = self.inner.lock();
        if let Some(reason) = &state.failing {
            return Err(QueueError::Rejected(reason.clone()));
        }
        state.jobs.push_back(job);
        Ok(())
    }
}
