// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! sluice-daemon: configuration, logging, and service wiring.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
pub mod env;
mod logging;
mod services;

pub use config::{Config, ConfigError, GatewaySettings, LogSettings};
pub use logging::{init_logging, LoggingError};
pub use services::{Backends, MemoryBackends, Services, DEFAULT_MODEL};
