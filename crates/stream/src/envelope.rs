// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal view of an event payload.
//!
//! The channel treats payloads as opaque; the gateway only needs the
//! `type` and `status` fields to find response boundaries and the
//! terminal status.

use serde::Deserialize;
use sluice_core::RunStatus;

pub const TYPE_STATUS: &str = "status";
pub const TYPE_RESPONSE_START: &str = "llm_response_start";
pub const TYPE_RESPONSE_END: &str = "llm_response_end";

/// How an event affects whether the channel prefix can be trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryRole {
    /// Opens a model response
    Open,
    /// Closes a model response
    Close,
    /// Terminal run status
    Terminal,
    Neutral,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Envelope {
    /// Parse the fields the gateway cares about.
    ///
    /// Payloads that are not JSON objects yield an empty envelope, which is
    /// neutral and non-terminal.
    pub fn parse(payload: &[u8]) -> Self {
        serde_json::from_slice(payload).unwrap_or_default()
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// The run status carried by a terminal `status` event.
    pub fn terminal_status(&self) -> Option<RunStatus> {
        if self.kind() != Some(TYPE_STATUS) {
            return None;
        }
        let status: RunStatus = self.status.as_deref()?.parse().ok()?;
        status.is_terminal().then_some(status)
    }

    pub fn boundary_role(&self) -> BoundaryRole {
        if self.terminal_status().is_some() {
            return BoundaryRole::Terminal;
        }
        match self.kind() {
            Some(TYPE_RESPONSE_START) => BoundaryRole::Open,
            Some(TYPE_RESPONSE_END) => BoundaryRole::Close,
            _ => BoundaryRole::Neutral,
        }
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
