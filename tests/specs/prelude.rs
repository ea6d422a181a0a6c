// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the specs.

pub use serde_json::json;
pub use sluice_admission::{AdmissionConfig, AdmissionError, AdmissionMode};
pub use sluice_core::{RunId, RunStatus, ThreadId};
pub use sluice_daemon::{Backends, Config, MemoryBackends, Services};
pub use sluice_engine::{DispatchError, JobSpec, RunJob};
pub use sluice_stream::{
    channel_key, ChannelStore, Frame, GatewayConfig, GatewayOutcome, StoreOp, StreamGateway,
};
pub use std::sync::Arc;
pub use std::time::Duration;

/// Services over in-memory backends, with the backends kept for inspection.
pub struct Harness {
    pub services: Services,
    pub memory: MemoryBackends,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let (backends, memory) = Backends::memory();
        Self { services: Services::new(config, backends), memory }
    }

    /// Dispatch a job for a fixed thread and requester.
    pub async fn start(&self) -> Result<RunId, DispatchError> {
        self.services
            .dispatcher()
            .start_run(ThreadId::from_string("thr-spec"), JobSpec::new("prj-spec", "acc-spec"))
            .await
    }

    /// Take the next queued job, as a worker would.
    pub fn take_job(&self) -> RunJob {
        self.memory.queue.pop().expect("a queued job")
    }

    pub fn run_status(&self, run_id: &RunId) -> RunStatus {
        self.memory.runs.runs().into_iter().find(|r| &r.id == run_id).expect("run record").status
    }

    pub async fn channel_len(&self, run_id: &RunId) -> usize {
        self.memory.channels.len(&channel_key(run_id)).await.unwrap()
    }

    /// Append raw event JSON to a run's channel.
    pub async fn append(&self, run_id: &RunId, event: serde_json::Value) {
        self.services.writer(run_id.clone()).append_json(&event).await.unwrap();
    }
}

pub fn start() -> serde_json::Value {
    json!({ "type": "llm_response_start" })
}

pub fn end() -> serde_json::Value {
    json!({ "type": "llm_response_end" })
}

pub fn status(status: &str) -> serde_json::Value {
    json!({ "type": "status", "status": status })
}

/// The `type` (or `status:<value>` for status events) of each frame.
pub fn kinds(frames: &[Frame]) -> Vec<String> {
    frames
        .iter()
        .map(|frame| {
            let body: serde_json::Value = serde_json::from_str(&frame.json()).unwrap();
            match (body["type"].as_str(), body["status"].as_str()) {
                (Some("status"), Some(status)) => format!("status:{status}"),
                (Some(kind), _) => kind.to_string(),
                _ => "?".to_string(),
            }
        })
        .collect()
}
