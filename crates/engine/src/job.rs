// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job request and queue message types.

use serde::{Deserialize, Serialize};
use sluice_core::{AccountId, AgentId, ProjectId, RunId, ThreadId};
use std::collections::HashMap;

/// What a client asks to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub project_id: ProjectId,
    /// Requester; running-run caches are keyed by this
    pub account_id: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    /// Requested model; the resolver picks one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Extra metadata copied onto the run record
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl JobSpec {
    pub fn new(project_id: impl Into<ProjectId>, account_id: impl Into<AccountId>) -> Self {
        Self {
            project_id: project_id.into(),
            account_id: account_id.into(),
            agent_id: None,
            model: None,
            metadata: HashMap::new(),
        }
    }

    sluice_core::setters! {
        option {
            agent_id: AgentId,
            model: String,
        }
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Effective parameters for a job after configuration is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedJob {
    pub model: String,
    pub agent_id: Option<AgentId>,
}

/// Message handed to the worker queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunJob {
    pub run_id: RunId,
    pub thread_id: ThreadId,
    pub project_id: ProjectId,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    pub account_id: AccountId,
    /// Correlation ID for tracing across the queue
    pub request_id: String,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
