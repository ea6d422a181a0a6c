// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered configuration: defaults, then an optional TOML file, then
//! environment overrides.

use crate::env;
use serde::{Deserialize, Serialize};
use sluice_admission::{AdmissionConfig, AdmissionMode};
use sluice_stream::GatewayConfig;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {name}='{value}': {reason}")]
    Env { name: &'static str, value: String, reason: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Tail read wait before a keep-alive ping
    pub poll_wait_ms: u64,
    /// Idle limit for a tailing session; 0 disables it
    pub max_idle_secs: u64,
    /// Channel retention after its terminal marker
    pub channel_ttl_secs: u64,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self { poll_wait_ms: 5_000, max_idle_secs: 3_600, channel_ttl_secs: 600 }
    }
}

impl GatewaySettings {
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            poll_wait: Duration::from_millis(self.poll_wait_ms),
            max_idle: (self.max_idle_secs > 0).then(|| Duration::from_secs(self.max_idle_secs)),
            ..GatewayConfig::default()
        }
    }

    pub fn channel_ttl(&self) -> Duration {
        Duration::from_secs(self.channel_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directives
    pub filter: String,
    /// Write daily-rotated log files here instead of stderr
    pub dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { filter: "info".to_string(), dir: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub admission: AdmissionConfig,
    pub gateway: GatewaySettings,
    pub log: LogSettings,
}

impl Config {
    /// Load from the process environment and the file it names.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(env::var)
    }

    /// Load using `lookup` in place of the process environment.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(env::CONFIG) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `SLUICE_*` overrides. Unset variables keep the current value.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let admission = &mut self.admission;
        set(&mut admission.mode, parse::<AdmissionMode>(&lookup, env::ADMISSION_MODE)?);
        set(&mut admission.local_limit, parse(&lookup, env::LOCAL_LIMIT)?);
        set(&mut admission.global_limit, parse(&lookup, env::GLOBAL_LIMIT)?);
        set(&mut admission.counter_ttl_secs, parse(&lookup, env::COUNTER_TTL_SECS)?);
        set(&mut admission.acquire_timeout_secs, parse(&lookup, env::ACQUIRE_TIMEOUT_SECS)?);

        let gateway = &mut self.gateway;
        set(&mut gateway.poll_wait_ms, parse(&lookup, env::POLL_WAIT_MS)?);
        set(&mut gateway.max_idle_secs, parse(&lookup, env::MAX_IDLE_SECS)?);
        set(&mut gateway.channel_ttl_secs, parse(&lookup, env::CHANNEL_TTL_SECS)?);

        set(&mut self.log.filter, lookup(env::LOG).filter(|s| !s.is_empty()));
        if let Some(dir) = lookup(env::LOG_DIR).filter(|s| !s.is_empty()) {
            self.log.dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.admission.validate().map_err(ConfigError::Invalid)?;
        if self.gateway.poll_wait_ms == 0 {
            return Err(ConfigError::Invalid("gateway.poll_wait_ms must be greater than 0".to_string()));
        }
        if self.gateway.channel_ttl_secs == 0 {
            return Err(ConfigError::Invalid("gateway.channel_ttl_secs must be greater than 0".to_string()));
        }
        Ok(())
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn parse<T>(lookup: impl Fn(&str) -> Option<String>, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(value) = lookup(name).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Env { name, value: value.clone(), reason: e.to_string() })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
