// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-side appender for a run's channel.

use crate::channel::StreamChannel;
use crate::envelope::{TYPE_RESPONSE_END, TYPE_RESPONSE_START, TYPE_STATUS};
use crate::store::{ChannelStore, StoreError};
use serde_json::{json, Value};
use sluice_core::{RunId, RunStatus};
use std::sync::Arc;
use std::time::Duration;

/// Appends events for one run and closes the channel with a terminal
/// status.
///
/// After [`ChannelWriter::finish`] the channel lives for `retention` so
/// late clients can still replay it, then expires.
#[derive(Debug, Clone)]
pub struct ChannelWriter {
    channel: StreamChannel,
    retention: Duration,
}

impl ChannelWriter {
    pub fn new(store: Arc<dyn ChannelStore>, run_id: RunId, retention: Duration) -> Self {
        Self { channel: StreamChannel::new(store, run_id), retention }
    }

    pub fn channel(&self) -> &StreamChannel {
        &self.channel
    }

    pub async fn append_json(&self, event: &Value) -> Result<String, StoreError> {
        self.channel.append(event.to_string()).await
    }

    pub async fn response_start(&self) -> Result<String, StoreError> {
        self.append_json(&json!({ "type": TYPE_RESPONSE_START })).await
    }

    pub async fn response_end(&self) -> Result<String, StoreError> {
        self.append_json(&json!({ "type": TYPE_RESPONSE_END })).await
    }

    pub async fn status(&self, status: RunStatus, message: Option<&str>) -> Result<String, StoreError> {
        let mut event = json!({ "type": TYPE_STATUS, "status": status.as_str() });
        if let Some(message) = message {
            event["message"] = Value::from(message);
        }
        self.append_json(&event).await
    }

    /// Append the terminal status and start the retention clock.
    pub async fn finish(&self, status: RunStatus, message: Option<&str>) -> Result<String, StoreError> {
        let id = self.status(status, message).await?;
        if let Err(e) = self.channel.expire(self.retention).await {
            tracing::warn!(run_id = %self.channel.run_id(), error = %e, "failed to set channel retention");
        }
        tracing::debug!(run_id = %self.channel.run_id(), %status, "channel finished");
        Ok(id)
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
