// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared atomic counter seam used by the distributed strategy.

use crate::error::CounterError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// External key-value store holding cluster-wide counters.
///
/// Semantics follow a Redis-style integer key: a missing key reads as zero,
/// `incr`/`decr` are atomic and return the post-operation value, and an
/// expired key disappears (resetting to zero).
#[async_trait]
pub trait CounterStore: Send + Sync + 'static {
    async fn incr(&self, key: &str) -> Result<i64, CounterError>;
    async fn decr(&self, key: &str) -> Result<i64, CounterError>;
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CounterError>;
    async fn get(&self, key: &str) -> Result<i64, CounterError>;
}

#[derive(Debug, Clone, Copy)]
struct Counter {
    value: i64,
    expires_at: Option<Instant>,
}

/// In-process [`CounterStore`].
///
/// Shared by clones, so several controllers built on clones of one store
/// behave like several processes sharing one external counter.
#[derive(Clone, Default)]
pub struct MemoryCounterStore {
    counters: Arc<Mutex<HashMap<String, Counter>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store becoming unreachable (or recovering).
    #[cfg(any(test, feature = "test-support"))]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Remaining TTL on a key, if one is set and not yet elapsed.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let counters = self.counters.lock();
        counters
            .get(key)
            .and_then(|c| c.expires_at)
            .and_then(|at| at.checked_duration_since(now))
    }

    fn check(&self) -> Result<(), CounterError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CounterError::Unavailable("memory counter store offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn update(&self, key: &str, delta: i64) -> i64 {
        let now = Instant::now();
        let mut counters = self.counters.lock();
        let counter = counters.entry(key.to_string()).or_insert(Counter { value: 0, expires_at: None });
        if counter.expires_at.is_some_and(|at| at <= now) {
            *counter = Counter { value: 0, expires_at: None };
        }
        counter.value += delta;
        counter.value
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr(&self, key: &str) -> Result<i64, CounterError> {
        self.check()?;
        Ok(self.update(key, 1))
    }

    async fn decr(&self, key: &str) -> Result<i64, CounterError> {
        self.check()?;
        Ok(self.update(key, -1))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), CounterError> {
        self.check()?;
        let mut counters = self.counters.lock();
        if let Some(counter) = counters.get_mut(key) {
            counter.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<i64, CounterError> {
        self.check()?;
        let now = Instant::now();
        let counters = self.counters.lock();
        Ok(counters
            .get(key)
            .filter(|c| !c.expires_at.is_some_and(|at| at <= now))
            .map_or(0, |c| c.value))
    }
}

#[cfg(test)]
#[path = "counter_tests.rs"]
mod tests;
