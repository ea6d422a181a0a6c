// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission error types

use std::time::Duration;
use thiserror::Error;

/// Failure to obtain a call slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// Capacity stayed exhausted for the whole acquire timeout.
    #[error("capacity saturated: {limit} concurrent calls in flight (waited {waited:?})")]
    Saturated { limit: usize, waited: Duration },
}

impl AdmissionError {
    /// Saturation clears as other calls finish; callers retry after backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdmissionError::Saturated { .. })
    }
}

/// Failure talking to the distributed counter store.
///
/// Never surfaced to `acquire` callers: the distributed strategy fails open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CounterError {
    #[error("counter store unavailable: {0}")]
    Unavailable(String),
}

/// Result of a guarded upstream call.
///
/// Keeps admission saturation apart from upstream failures so callers can
/// apply separate retry policies.
#[derive(Debug, Error)]
pub enum CallError<E> {
    #[error(transparent)]
    Admission(AdmissionError),
    #[error("upstream call failed: {0}")]
    Upstream(E),
}

impl<E> CallError<E> {
    pub fn is_saturated(&self) -> bool {
        matches!(self, CallError::Admission(AdmissionError::Saturated { .. }))
    }

    pub fn upstream(self) -> Option<E> {
        match self {
            CallError::Upstream(e) => Some(e),
            CallError::Admission(_) => None,
        }
    }
}
