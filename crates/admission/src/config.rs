// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Which strategy bounds upstream calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionMode {
    /// Process-local semaphore only
    Local,
    /// Cluster-wide counter, failing open when the store is unreachable
    #[default]
    Distributed,
}

sluice_core::simple_display! {
    AdmissionMode {
        Local => "local",
        Distributed => "distributed",
    }
}

impl FromStr for AdmissionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(AdmissionMode::Local),
            "distributed" | "redis" => Ok(AdmissionMode::Distributed),
            other => Err(format!("unknown admission mode '{other}' (expected local|distributed)")),
        }
    }
}

/// Tunables for the admission controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    pub mode: AdmissionMode,
    /// Capacity of the process-local semaphore
    pub local_limit: usize,
    /// Cluster-wide capacity of the distributed counter
    pub global_limit: usize,
    /// TTL on the counter key, refreshed on every successful increment
    pub counter_ttl_secs: u64,
    pub acquire_timeout_secs: u64,
    /// Sleep between over-limit retries in distributed mode
    pub retry_backoff_ms: u64,
    pub counter_key: String,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            mode: AdmissionMode::default(),
            local_limit: 32,
            global_limit: 100,
            counter_ttl_secs: 300,
            acquire_timeout_secs: 5,
            retry_backoff_ms: 50,
            counter_key: "sluice:llm:active".to_string(),
        }
    }
}

impl AdmissionConfig {
    sluice_core::setters! {
        into {
            counter_key: String,
        }
        set {
            mode: AdmissionMode,
            local_limit: usize,
            global_limit: usize,
            counter_ttl_secs: u64,
            acquire_timeout_secs: u64,
            retry_backoff_ms: u64,
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn counter_ttl(&self) -> Duration {
        Duration::from_secs(self.counter_ttl_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Reject configurations that would block every call.
    pub fn validate(&self) -> Result<(), String> {
        if self.local_limit == 0 {
            return Err("admission.local_limit must be at least 1".to_string());
        }
        if self.global_limit == 0 {
            return Err("admission.global_limit must be at least 1".to_string());
        }
        if self.acquire_timeout_secs == 0 {
            return Err("admission.acquire_timeout_secs must be greater than 0".to_string());
        }
        if self.counter_ttl_secs == 0 {
            return Err("admission.counter_ttl_secs must be greater than 0".to_string());
        }
        if self.counter_key.is_empty() {
            return Err("admission.counter_key must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
