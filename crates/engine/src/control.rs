// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Out-of-band control signals to workers.

use async_trait::async_trait;
use parking_lot::Mutex;
use sluice_core::RunId;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Stop,
}

sluice_core::simple_display! {
    ControlSignal {
        Stop => "STOP",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("control bus unavailable: {0}")]
    Unavailable(String),
}

/// Pub/sub channel workers listen on for signals about their run.
#[async_trait]
pub trait ControlBus: Send + Sync + 'static {
    async fn publish(&self, run_id: &RunId, signal: ControlSignal) -> Result<(), ControlError>;
}

#[derive(Default)]
struct State {
    published: Vec<(RunId, ControlSignal)>,
    unavailable: bool,
}

/// Records published signals.
#[derive(Clone, Default)]
pub struct MemoryControlBus {
    inner: Arc<Mutex<State>>,
}

impl MemoryControlBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<(RunId, ControlSignal)> {
        self.inner.lock().published.clone()
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unavailable = unavailable;
    }
}

#[async_trait]
impl ControlBus for MemoryControlBus {
    async fn publish(&self, run_id: &RunId, signal: ControlSignal) -> Result<(), ControlError> {
        let mut state = self.inner.lock();
        if state.unavailable {
            return Err(ControlError::Unavailable("memory control bus offline".to_string()));
        }
        state.published.push((run_id.clone(), signal));
        Ok(())
    }
}
