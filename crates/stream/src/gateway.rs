// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-facing stream gateway.
//!
//! One gateway session serves one client watching one run:
//!
//! 1. Catch-up: forward every entry already in the channel. A terminal
//!    status ends the session here, with the channel left untouched.
//! 2. Trim: if the catch-up batch ended with no response open, drop
//!    everything through its last safe boundary.
//! 3. Tail: block for entries after the last one forwarded, pinging on
//!    each empty wait, until a terminal status, a disconnect, a store
//!    error, or the idle limit.

use crate::boundary::BoundaryScan;
use crate::channel::StreamChannel;
use crate::entry::Entry;
use crate::envelope::Envelope;
use crate::frame::Frame;
use crate::store::ChannelStore;
use sluice_core::{RunId, RunStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const IDLE_TIMEOUT_MESSAGE: &str = "stream idle timeout";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayConfig {
    /// How long one tail read blocks before a ping is sent
    pub poll_wait: Duration,
    /// Give up after this long without a new entry (`None` waits forever)
    pub max_idle: Option<Duration>,
    /// Frames buffered between the gateway task and the client
    pub buffer: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { poll_wait: Duration::from_secs(5), max_idle: Some(Duration::from_secs(3600)), buffer: 64 }
    }
}

/// Why a gateway session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// A terminal status event was forwarded
    Terminal(RunStatus),
    /// The client went away or cancelled
    Disconnected,
    /// The store failed; a synthetic error frame was sent
    Errored(String),
    /// No new entries within the idle limit
    IdleTimeout,
}

#[derive(Clone)]
pub struct StreamGateway {
    store: Arc<dyn ChannelStore>,
    config: GatewayConfig,
}

impl StreamGateway {
    pub fn new(store: Arc<dyn ChannelStore>, config: GatewayConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run a session on a background task.
    pub fn spawn(&self, run_id: RunId) -> GatewaySession {
        let (tx, frames) = mpsc::channel(self.config.buffer.max(1));
        let cancel = CancellationToken::new();
        let gateway = self.clone();
        let token = cancel.clone();
        let handle = tokio::spawn(async move { gateway.serve(&run_id, &tx, &token).await });
        GatewaySession { frames, cancel, handle }
    }

    /// Serve one client until the session ends.
    ///
    /// Stops promptly once `cancel` fires or the receiving side of `frames`
    /// is dropped.
    pub async fn serve(
        &self,
        run_id: &RunId,
        frames: &mpsc::Sender<Frame>,
        cancel: &CancellationToken,
    ) -> GatewayOutcome {
        let channel = StreamChannel::new(Arc::clone(&self.store), run_id.clone());
        let outcome = self.run(&channel, frames, cancel).await;
        tracing::info!(run_id = %run_id, ?outcome, "stream session closed");
        outcome
    }

    async fn run(
        &self,
        channel: &StreamChannel,
        frames: &mpsc::Sender<Frame>,
        cancel: &CancellationToken,
    ) -> GatewayOutcome {
        let batch = match channel.read_all().await {
            Ok(batch) => batch,
            Err(e) => return fail(frames, cancel, format!("failed to read stream: {e}")).await,
        };
        tracing::info!(run_id = %channel.run_id(), replay = batch.len(), "stream session attached");

        let mut scan = BoundaryScan::default();
        let mut cursor = None;
        for (index, entry) in batch.iter().enumerate() {
            let envelope = Envelope::parse(&entry.payload);
            if !deliver(frames, cancel, Frame::event(entry)).await {
                return GatewayOutcome::Disconnected;
            }
            cursor = Some(entry.id.clone());
            if let Some(status) = envelope.terminal_status() {
                return GatewayOutcome::Terminal(status);
            }
            scan.push(index, envelope.boundary_role());
        }

        if let Some(boundary) = scan.trim_point().and_then(|i| batch.get(i)) {
            trim(channel, boundary).await;
        } else if !scan.is_balanced() {
            tracing::debug!(run_id = %channel.run_id(), "unmatched response end in catch-up, skipping trim");
        }

        self.tail(channel, cursor, frames, cancel).await
    }

    async fn tail(
        &self,
        channel: &StreamChannel,
        mut cursor: Option<String>,
        frames: &mpsc::Sender<Frame>,
        cancel: &CancellationToken,
    ) -> GatewayOutcome {
        let mut last_entry_at = Instant::now();
        loop {
            let read = tokio::select! {
                _ = cancel.cancelled() => return GatewayOutcome::Disconnected,
                _ = frames.closed() => return GatewayOutcome::Disconnected,
                read = channel.read_after(cursor.as_deref(), self.config.poll_wait) => read,
            };
            let entries = match read {
                Ok(entries) => entries,
                Err(e) => return fail(frames, cancel, format!("failed to read stream: {e}")).await,
            };

            if entries.is_empty() {
                if self.config.max_idle.is_some_and(|max| last_entry_at.elapsed() >= max) {
                    tracing::warn!(run_id = %channel.run_id(), "stream idle limit reached");
                    deliver(frames, cancel, Frame::error(IDLE_TIMEOUT_MESSAGE)).await;
                    return GatewayOutcome::IdleTimeout;
                }
                if !deliver(frames, cancel, Frame::Ping).await {
                    return GatewayOutcome::Disconnected;
                }
                continue;
            }

            last_entry_at = Instant::now();
            for entry in &entries {
                if !deliver(frames, cancel, Frame::event(entry)).await {
                    return GatewayOutcome::Disconnected;
                }
                cursor = Some(entry.id.clone());
                if let Some(status) = Envelope::parse(&entry.payload).terminal_status() {
                    return GatewayOutcome::Terminal(status);
                }
            }
        }
    }
}

/// Trim failures are logged and otherwise ignored.
async fn trim(channel: &StreamChannel, boundary: &Entry) {
    match channel.trim_through(&boundary.id).await {
        Ok(removed) => {
            tracing::debug!(run_id = %channel.run_id(), boundary = %boundary.id, removed, "trimmed stream")
        }
        Err(e) => {
            tracing::warn!(run_id = %channel.run_id(), boundary = %boundary.id, error = %e, "stream trim failed")
        }
    }
}

async fn deliver(frames: &mpsc::Sender<Frame>, cancel: &CancellationToken, frame: Frame) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = frames.send(frame) => sent.is_ok(),
    }
}

async fn fail(frames: &mpsc::Sender<Frame>, cancel: &CancellationToken, message: String) -> GatewayOutcome {
    tracing::error!(error = %message, "stream session failed");
    deliver(frames, cancel, Frame::error(message.clone())).await;
    GatewayOutcome::Errored(message)
}

/// Handle to a gateway session running on its own task.
///
/// Dropping the session (or its `frames` receiver) disconnects the client.
pub struct GatewaySession {
    pub frames: mpsc::Receiver<Frame>,
    cancel: CancellationToken,
    handle: JoinHandle<GatewayOutcome>,
}

impl GatewaySession {
    pub async fn next_frame(&mut self) -> Option<Frame> {
        self.frames.recv().await
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the session to end, discarding undelivered frames.
    pub async fn outcome(self) -> GatewayOutcome {
        drop(self.frames);
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => GatewayOutcome::Errored(e.to_string()),
        }
    }

    /// Drain every frame until the session ends, then report why it ended.
    pub async fn collect(mut self) -> (Vec<Frame>, GatewayOutcome) {
        let mut received = Vec::new();
        while let Some(frame) = self.frames.recv().await {
            received.push(frame);
        }
        (received, self.outcome().await)
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
