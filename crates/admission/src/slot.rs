// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Call slots: one permit per in-flight upstream call.

use crate::counter::CounterStore;
use crate::stats::CallStats;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedSemaphorePermit;
use tokio::time::Instant;

/// Strategy-specific backing of a slot.
pub enum Permit {
    /// Held semaphore permit; returned on drop
    Local(OwnedSemaphorePermit),
    /// Increment on a shared counter that must be decremented once
    Counter { store: Arc<dyn CounterStore>, key: String },
    /// Admitted without a reservation because the coordinator was unreachable
    FailOpen,
}

impl Permit {
    pub fn is_fail_open(&self) -> bool {
        matches!(self, Permit::FailOpen)
    }

    async fn release(self) {
        if let Permit::Counter { store, key } = self {
            decrement(store, key).await;
        }
    }

    /// Release without awaiting; counter decrements run on a spawned task.
    pub(crate) fn release_detached(self) {
        if let Permit::Counter { store, key } = self {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(decrement(store, key));
                }
                Err(_) => {
                    tracing::warn!(key = %key, "no runtime to release admission counter; key TTL will reclaim it");
                }
            }
        }
    }
}

async fn decrement(store: Arc<dyn CounterStore>, key: String) {
    if let Err(e) = store.decr(&key).await {
        tracing::warn!(key = %key, error = %e, "failed to release admission counter; key TTL will reclaim it");
    }
}

/// An acquired call slot.
///
/// Released exactly once: explicitly through [`Slot::release`], or on drop
/// when the guarded call is cancelled or unwinds.
pub struct Slot {
    permit: Option<Permit>,
    stats: Arc<CallStats>,
    acquired_at: Instant,
}

impl Slot {
    pub(crate) fn new(permit: Permit, stats: Arc<CallStats>) -> Self {
        Self { permit: Some(permit), stats, acquired_at: Instant::now() }
    }

    pub fn is_fail_open(&self) -> bool {
        self.permit.as_ref().is_some_and(Permit::is_fail_open)
    }

    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }

    /// Return the slot, awaiting the counter decrement in distributed mode.
    pub async fn release(mut self) {
        if let Some(permit) = self.take() {
            permit.release().await;
        }
    }

    /// Return the slot from a synchronous context.
    pub(crate) fn release_now(&mut self) {
        if let Some(permit) = self.take() {
            permit.release_detached();
        }
    }

    fn take(&mut self) -> Option<Permit> {
        let permit = self.permit.take()?;
        self.stats.record_released(self.acquired_at.elapsed());
        Some(permit)
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.permit {
            Some(Permit::Local(_)) => "local",
            Some(Permit::Counter { .. }) => "counter",
            Some(Permit::FailOpen) => "fail_open",
            None => "released",
        };
        f.debug_struct("Slot").field("kind", &kind).field("held_for", &self.held_for()).finish()
    }
}
