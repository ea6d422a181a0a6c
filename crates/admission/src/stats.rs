// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observability counters for admission.
//!
//! Counters are plain relaxed atomics: they are read for dashboards and
//! tests only and never gate acquire/release.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

/// Process-local call counters, shared by the controller and its slots.
#[derive(Debug, Default)]
pub struct CallStats {
    total_calls: AtomicU64,
    active_calls: AtomicI64,
    rejected_calls: AtomicU64,
    fail_open_calls: AtomicU64,
    completed_calls: AtomicU64,
    total_wait_us: AtomicU64,
    total_call_us: AtomicU64,
}

/// Point-in-time copy of [`CallStats`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_calls: u64,
    pub active_calls: i64,
    pub rejected_calls: u64,
    pub fail_open_calls: u64,
    pub total_wait_ms: u64,
    pub total_call_ms: u64,
    pub avg_wait_ms: f64,
    pub avg_call_ms: f64,
}

impl CallStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_acquired(&self, waited: Duration, fail_open: bool) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.active_calls.fetch_add(1, Ordering::Relaxed);
        self.total_wait_us.fetch_add(micros(waited), Ordering::Relaxed);
        if fail_open {
            self.fail_open_calls.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_rejected(&self, waited: Duration) {
        self.rejected_calls.fetch_add(1, Ordering::Relaxed);
        self.total_wait_us.fetch_add(micros(waited), Ordering::Relaxed);
    }

    pub(crate) fn record_released(&self, held: Duration) {
        self.active_calls.fetch_sub(1, Ordering::Relaxed);
        self.completed_calls.fetch_add(1, Ordering::Relaxed);
        self.total_call_us.fetch_add(micros(held), Ordering::Relaxed);
    }

    pub fn active_calls(&self) -> i64 {
        self.active_calls.load(Ordering::Relaxed)
    }

    pub fn rejected_calls(&self) -> u64 {
        self.rejected_calls.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let total_calls = self.total_calls.load(Ordering::Relaxed);
        let rejected_calls = self.rejected_calls.load(Ordering::Relaxed);
        let completed = self.completed_calls.load(Ordering::Relaxed);
        let wait_us = self.total_wait_us.load(Ordering::Relaxed);
        let call_us = self.total_call_us.load(Ordering::Relaxed);
        let attempts = total_calls + rejected_calls;
        StatsSnapshot {
            total_calls,
            active_calls: self.active_calls(),
            rejected_calls,
            fail_open_calls: self.fail_open_calls.load(Ordering::Relaxed),
            total_wait_ms: wait_us / 1_000,
            total_call_ms: call_us / 1_000,
            avg_wait_ms: average_ms(wait_us, attempts),
            avg_call_ms: average_ms(call_us, completed),
        }
    }
}

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

fn average_ms(total_us: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total_us as f64 / count as f64 / 1_000.0
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
