// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run record and status state machine.

use crate::id::{RunId, ThreadId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Metadata key holding the resolved model identifier.
pub const META_MODEL: &str = "model_name";
/// Metadata key holding the requester account identifier.
pub const META_REQUESTER: &str = "requester";

/// Lifecycle status of a run.
///
/// `Running` is the only non-terminal state. Once terminal, a run never
/// changes status again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    Stopped,
    Error,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunStatus::Running)
    }

    /// Whether writing `next` over `self` is allowed.
    ///
    /// Re-writing the current status is accepted as a no-op so that retried
    /// writes stay idempotent.
    pub fn can_transition_to(self, next: RunStatus) -> bool {
        self == next || self == RunStatus::Running
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Stopped => "stopped",
            RunStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown run status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for RunStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            "stopped" => Ok(RunStatus::Stopped),
            "error" => Ok(RunStatus::Error),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Rejected attempt to move a run backwards out of a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("run {run_id}: cannot transition {from} -> {to}")]
pub struct InvalidTransition {
    pub run_id: RunId,
    pub from: RunStatus,
    pub to: RunStatus,
}

/// One execution of an agent job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub thread_id: ThreadId,
    pub status: RunStatus,
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Run {
    /// A freshly dispatched run in `running` state.
    pub fn started(id: RunId, thread_id: ThreadId, started_at_ms: u64) -> Self {
        Self {
            id,
            thread_id,
            status: RunStatus::Running,
            started_at_ms,
            completed_at_ms: None,
            error: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn model_name(&self) -> Option<&str> {
        self.metadata.get(META_MODEL).and_then(|v| v.as_str())
    }

    pub fn requester(&self) -> Option<&str> {
        self.metadata.get(META_REQUESTER).and_then(|v| v.as_str())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a status write.
    ///
    /// Returns `Ok(true)` when the status changed and `Ok(false)` for an
    /// idempotent re-write. Terminal writes stamp `completed_at_ms`.
    pub fn transition(
        &mut self,
        next: RunStatus,
        at_ms: u64,
        error: Option<String>,
    ) -> Result<bool, InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition { run_id: self.id.clone(), from: self.status, to: next });
        }
        if self.status == next {
            return Ok(false);
        }
        self.status = next;
        if next.is_terminal() {
            self.completed_at_ms = Some(at_ms);
        }
        if error.is_some() {
            self.error = error;
        }
        Ok(true)
    }
}

/// Test builder for [`Run`].
#[cfg(any(test, feature = "test-support"))]
pub struct RunBuilder {
    id: RunId,
    thread_id: ThreadId,
    status: RunStatus,
    started_at_ms: u64,
    metadata: HashMap<String, serde_json::Value>,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for RunBuilder {
    fn default() -> Self {
        Self {
            id: RunId::from_string("run-test"),
            thread_id: ThreadId::from_string("thr-test"),
            status: RunStatus::Running,
            started_at_ms: 1_000_000,
            metadata: HashMap::new(),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl RunBuilder {
    crate::setters! {
        into {
            id: RunId,
            thread_id: ThreadId,
        }
        set {
            status: RunStatus,
            started_at_ms: u64,
        }
    }

    pub fn meta(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Run {
        Run {
            id: self.id,
            thread_id: self.thread_id,
            completed_at_ms: self.status.is_terminal().then_some(self.started_at_ms),
            status: self.status,
            started_at_ms: self.started_at_ms,
            error: None,
            metadata: self.metadata,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Run {
    /// Create a builder with test defaults.
    pub fn builder() -> RunBuilder {
        RunBuilder::default()
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
