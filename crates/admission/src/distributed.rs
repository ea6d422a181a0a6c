// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster-wide admission via a shared counter.

use crate::config::{AdmissionConfig, AdmissionMode};
use crate::controller::AdmissionStrategy;
use crate::counter::CounterStore;
use crate::error::{AdmissionError, CounterError};
use crate::slot::Permit;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Bounds calls across every process sharing the counter key.
///
/// Acquire increments the counter; a post-increment value above the limit
/// is rolled back and retried after a backoff until the timeout. Every
/// successful increment refreshes the key TTL so that increments leaked by
/// crashed holders eventually disappear.
pub struct DistributedStrategy {
    store: Arc<dyn CounterStore>,
    key: String,
    limit: usize,
    ttl: Duration,
    backoff: Duration,
}

impl DistributedStrategy {
    pub fn new(store: Arc<dyn CounterStore>, config: &AdmissionConfig) -> Self {
        Self {
            store,
            key: config.counter_key.clone(),
            limit: config.global_limit,
            ttl: config.counter_ttl(),
            backoff: config.retry_backoff(),
        }
    }

    fn fail_open(&self, error: &dyn std::fmt::Display) -> Permit {
        tracing::warn!(
            key = %self.key,
            error = %error,
            "admission counter unreachable, failing open"
        );
        Permit::FailOpen
    }
}

/// An increment that has not yet become a slot.
///
/// Dropping it while armed (the acquire was cancelled, or the rollback
/// failed) spawns the matching decrement.
struct Reservation {
    store: Arc<dyn CounterStore>,
    key: String,
    armed: bool,
}

impl Reservation {
    fn new(store: &Arc<dyn CounterStore>, key: &str) -> Self {
        Self { store: Arc::clone(store), key: key.to_string(), armed: true }
    }

    fn into_permit(mut self) -> Permit {
        self.armed = false;
        Permit::Counter { store: Arc::clone(&self.store), key: self.key.clone() }
    }

    async fn roll_back(mut self) -> Result<(), CounterError> {
        self.store.decr(&self.key).await?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!(key = %self.key, "releasing unclaimed admission increment");
            Permit::Counter { store: Arc::clone(&self.store), key: self.key.clone() }.release_detached();
        }
    }
}

#[async_trait]
impl AdmissionStrategy for DistributedStrategy {
    async fn acquire(&self, timeout: Duration) -> Result<Permit, AdmissionError> {
        let started = Instant::now();
        let deadline = started + timeout;
        let limit = i64::try_from(self.limit).unwrap_or(i64::MAX);

        loop {
            let value = match self.store.incr(&self.key).await {
                Ok(value) => value,
                Err(e) => return Ok(self.fail_open(&e)),
            };
            // Given back on drop unless handed to the caller or rolled back
            let reservation = Reservation::new(&self.store, &self.key);
            if value <= limit {
                if let Err(e) = self.store.expire(&self.key, self.ttl).await {
                    tracing::warn!(key = %self.key, error = %e, "failed to refresh admission counter TTL");
                }
                return Ok(reservation.into_permit());
            }
            if let Err(e) = reservation.roll_back().await {
                return Ok(self.fail_open(&e));
            }
            tracing::trace!(key = %self.key, value, limit, "admission over limit, backing off");

            let now = Instant::now();
            if now >= deadline {
                return Err(AdmissionError::Saturated { limit: self.limit, waited: now - started });
            }
            tokio::time::sleep(self.backoff.min(deadline - now)).await;
        }
    }

    fn mode(&self) -> AdmissionMode {
        AdmissionMode::Distributed
    }

    fn limit(&self) -> usize {
        self.limit
    }

    async fn in_flight(&self) -> Option<i64> {
        self.store.get(&self.key).await.ok()
    }
}
