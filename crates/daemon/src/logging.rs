// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.

use crate::config::LogSettings;
use std::sync::OnceLock;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },
    #[error("failed to install subscriber: {0}")]
    Install(String),
}

/// Keeps the file writer flushing for the life of the process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static INSTALLED: OnceLock<()> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "sluice.log";

/// Install the global subscriber.
///
/// Returns `Ok(false)` if one was already installed by an earlier call.
pub fn init_logging(settings: &LogSettings) -> Result<bool, LoggingError> {
    let filter = EnvFilter::try_new(&settings.filter)
        .map_err(|e| LoggingError::Filter { filter: settings.filter.clone(), reason: e.to_string() })?;
    if INSTALLED.get().is_some() {
        return Ok(false);
    }

    let installed = match &settings.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let result = tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
                .try_init();
            if result.is_ok() {
                let _ = FILE_GUARD.set(guard);
            }
            result
        }
        None => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    match installed {
        Ok(()) => {
            let _ = INSTALLED.set(());
            tracing::info!(filter = %settings.filter, dir = ?settings.dir, "logging initialized");
            Ok(true)
        }
        Err(e) if INSTALLED.get().is_some() => {
            tracing::debug!(error = %e, "logging already initialized");
            Ok(false)
        }
        Err(e) => Err(LoggingError::Install(e.to_string())),
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
