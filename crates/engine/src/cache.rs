// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caches summarizing a requester's running runs.

use async_trait::async_trait;
use parking_lot::Mutex;
use sluice_core::AccountId;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Cache key for the "currently running runs" summary of a requester.
pub fn running_runs_key(account_id: &AccountId) -> String {
    format!("running_runs:{account_id}")
}

#[async_trait]
pub trait CacheInvalidator: Send + Sync + 'static {
    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}

#[derive(Default)]
struct State {
    invalidated: Vec<String>,
    unavailable: bool,
}

/// Records invalidated keys.
#[derive(Clone, Default)]
pub struct MemoryCacheInvalidator {
    inner: Arc<Mutex<State>>,
}

impl MemoryCacheInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidated(&self) -> Vec<String> {
        self.inner.lock().invalidated.clone()
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unavailable = unavailable;
    }
}

#[async_trait]
impl CacheInvalidator for MemoryCacheInvalidator {
    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let mut state = self.inner.lock();
        if state.unavailable {
            return Err(CacheError::Unavailable("memory cache offline".to_string()));
        }
        state.invalidated.push(key.to_string());
        Ok(())
    }
}
