// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run dispatch and stop.

use crate::cache::CacheInvalidator;
use crate::control::{ControlBus, ControlSignal};
use crate::error::{DispatchError, StopError};
use crate::job::{JobSpec, RunJob};
use crate::queue::JobQueue;
use crate::registry::RunRegistry;
use crate::resolver::ConfigResolver;
use crate::run_store::{RunStore, RunStoreError};
use sluice_core::{Clock, RunId, RunStatus, SystemClock, ThreadId, META_MODEL, META_REQUESTER};
use sluice_stream::{ChannelStore, ChannelWriter, StreamChannel};
use std::sync::Arc;
use std::time::Duration;

/// External collaborators the dispatcher drives.
#[derive(Clone)]
pub struct DispatchDeps {
    pub runs: Arc<dyn RunStore>,
    pub cache: Arc<dyn CacheInvalidator>,
    pub channels: Arc<dyn ChannelStore>,
    pub queue: Arc<dyn JobQueue>,
    pub resolver: Arc<dyn ConfigResolver>,
    pub control: Arc<dyn ControlBus>,
}

#[derive(Clone)]
pub struct Dispatcher<C: Clock = SystemClock> {
    registry: RunRegistry<C>,
    channels: Arc<dyn ChannelStore>,
    queue: Arc<dyn JobQueue>,
    resolver: Arc<dyn ConfigResolver>,
    control: Arc<dyn ControlBus>,
    /// How long a channel outlives its terminal marker
    channel_ttl: Duration,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(deps: DispatchDeps, clock: C, channel_ttl: Duration) -> Self {
        Self {
            registry: RunRegistry::new(deps.runs, deps.cache, clock),
            channels: deps.channels,
            queue: deps.queue,
            resolver: deps.resolver,
            control: deps.control,
            channel_ttl,
        }
    }

    pub fn registry(&self) -> &RunRegistry<C> {
        &self.registry
    }

    /// Worker-side writer for a run's channel.
    pub fn writer(&self, run_id: RunId) -> ChannelWriter {
        ChannelWriter::new(Arc::clone(&self.channels), run_id, self.channel_ttl)
    }

    /// Create a run, its channel, and its queued job.
    ///
    /// On success the channel already exists, so a client may attach before
    /// the worker starts. On failure after the run record was written, the
    /// record is marked `failed` before the error is returned.
    pub async fn start_run(&self, thread_id: ThreadId, spec: JobSpec) -> Result<RunId, DispatchError> {
        let resolved = match self.resolver.resolve(&spec).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::error!(thread_id = %thread_id, error = %e, "job config resolution failed");
                return Err(e.into());
            }
        };

        let run_id = RunId::new();
        let mut metadata = spec.metadata;
        metadata.insert(META_MODEL.to_string(), resolved.model.clone().into());
        metadata.insert(META_REQUESTER.to_string(), spec.account_id.as_str().into());
        if let Err(e) = self.registry.create(run_id.clone(), thread_id.clone(), metadata).await {
            tracing::error!(run_id = %run_id, error = %e, "failed to create run record");
            return Err(e.into());
        }

        self.registry.invalidate_running(&spec.account_id);

        let channel = StreamChannel::new(Arc::clone(&self.channels), run_id.clone());
        if let Err(e) = channel.create().await {
            return Err(self.abandon(&run_id, e.into()).await);
        }

        let request_id = uuid::Uuid::new_v4().to_string();
        let job = RunJob {
            run_id: run_id.clone(),
            thread_id: thread_id.clone(),
            project_id: spec.project_id,
            model: resolved.model,
            agent_id: resolved.agent_id,
            account_id: spec.account_id,
            request_id: request_id.clone(),
        };
        if let Err(e) = self.queue.enqueue(job).await {
            return Err(self.abandon(&run_id, e.into()).await);
        }

        tracing::info!(run_id = %run_id, thread_id = %thread_id, %request_id, "run dispatched");
        Ok(run_id)
    }

    /// Compensate a dispatch that failed after the run record was written.
    async fn abandon(&self, run_id: &RunId, err: DispatchError) -> DispatchError {
        tracing::error!(run_id = %run_id, error = %err, "dispatch failed, marking run failed");
        if let Err(e) = self.registry.set_status(run_id, RunStatus::Failed, Some(err.to_string())).await {
            tracing::error!(run_id = %run_id, error = %e, "failed to mark run failed");
        }
        err
    }

    /// Stop a run and return its final status.
    ///
    /// Already-terminal runs are left alone. Otherwise the record is marked
    /// `stopped`, the worker is signalled, and a terminal marker is appended
    /// so attached clients close even if the worker is gone. Signal and
    /// marker failures are logged only.
    pub async fn stop_run(&self, run_id: &RunId, reason: Option<&str>) -> Result<RunStatus, StopError> {
        let Some(run) = self.registry.get(run_id).await? else {
            return Err(StopError::NotFound(run_id.clone()));
        };
        if run.is_terminal() {
            tracing::debug!(run_id = %run_id, status = %run.status, "stop on finished run");
            return Ok(run.status);
        }

        match self.registry.set_status(run_id, RunStatus::Stopped, reason.map(str::to_string)).await {
            Ok(_) => {}
            // Finished between the read and the write
            Err(RunStoreError::Transition(t)) => return Ok(t.from),
            Err(e) => return Err(e.into()),
        }

        if let Err(e) = self.control.publish(run_id, ControlSignal::Stop).await {
            tracing::warn!(run_id = %run_id, error = %e, "failed to signal worker");
        }
        if let Err(e) = self.writer(run_id.clone()).finish(RunStatus::Stopped, reason).await {
            tracing::warn!(run_id = %run_id, error = %e, "failed to append stop marker");
        }

        tracing::info!(run_id = %run_id, "run stopped");
        Ok(RunStatus::Stopped)
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
