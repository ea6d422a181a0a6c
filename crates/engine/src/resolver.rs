// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effective job configuration.

use crate::job::{JobSpec, ResolvedJob};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("agent {0} not found")]
    AgentNotFound(String),
    #[error("config lookup failed: {0}")]
    Unavailable(String),
}

/// Resolves the model and agent a job will actually run with.
#[async_trait]
pub trait ConfigResolver: Send + Sync + 'static {
    async fn resolve(&self, spec: &JobSpec) -> Result<ResolvedJob, ResolveError>;
}

/// Resolver that honours the requested model or falls back to a default.
#[derive(Clone)]
pub struct StaticConfigResolver {
    default_model: String,
    failure: Arc<Mutex<Option<ResolveError>>>,
}

impl StaticConfigResolver {
    pub fn new(default_model: impl Into<String>) -> Self {
        Self { default_model: default_model.into(), failure: Arc::new(Mutex::new(None)) }
    }

    /// Fail every resolve with `error` until cleared with `None`.
    #[cfg(any(test, feature = "test-support"))]
    pub fn set_failure(&self, error: Option<ResolveError>) {
        *self.failure.lock() = error;
    }
}

#[async_trait]
impl ConfigResolver for StaticConfigResolver {
    async fn resolve(&self, spec: &JobSpec) -> Result<ResolvedJob, ResolveError> {
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        Ok(ResolvedJob {
            model: spec.model.clone().unwrap_or_else(|| self.default_model.clone()),
            agent_id: spec.agent_id.clone(),
        })
    }
}
