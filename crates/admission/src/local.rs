// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-local admission via a counting semaphore.

use crate::config::AdmissionMode;
use crate::controller::AdmissionStrategy;
use crate::error::AdmissionError;
use crate::slot::Permit;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Bounds calls made by this process only.
pub struct LocalStrategy {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl LocalStrategy {
    pub fn new(limit: usize) -> Self {
        Self { semaphore: Arc::new(Semaphore::new(limit)), limit }
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[async_trait]
impl AdmissionStrategy for LocalStrategy {
    async fn acquire(&self, timeout: Duration) -> Result<Permit, AdmissionError> {
        let saturated = AdmissionError::Saturated { limit: self.limit, waited: timeout };
        match tokio::time::timeout(timeout, self.semaphore.clone().acquire_owned()).await {
            Ok(Ok(permit)) => Ok(Permit::Local(permit)),
            // The semaphore is never closed; treat it like exhaustion regardless
            Ok(Err(_)) | Err(_) => Err(saturated),
        }
    }

    fn mode(&self) -> AdmissionMode {
        AdmissionMode::Local
    }

    fn limit(&self) -> usize {
        self.limit
    }
}
