// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

pub const CONFIG: &str = "SLUICE_CONFIG";
pub const ADMISSION_MODE: &str = "SLUICE_ADMISSION_MODE";
pub const LOCAL_LIMIT: &str = "SLUICE_LOCAL_LIMIT";
pub const GLOBAL_LIMIT: &str = "SLUICE_GLOBAL_LIMIT";
pub const COUNTER_TTL_SECS: &str = "SLUICE_COUNTER_TTL_SECS";
pub const ACQUIRE_TIMEOUT_SECS: &str = "SLUICE_ACQUIRE_TIMEOUT_SECS";
pub const POLL_WAIT_MS: &str = "SLUICE_POLL_WAIT_MS";
pub const MAX_IDLE_SECS: &str = "SLUICE_MAX_IDLE_SECS";
pub const CHANNEL_TTL_SECS: &str = "SLUICE_CHANNEL_TTL_SECS";
pub const LOG: &str = "SLUICE_LOG";
pub const LOG_DIR: &str = "SLUICE_LOG_DIR";

/// Read a variable from the process environment. Empty counts as unset.
pub fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
