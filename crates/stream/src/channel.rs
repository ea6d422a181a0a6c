// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-run view over a [`ChannelStore`].

use crate::entry::{trim_floor, Entry};
use crate::store::{ChannelStore, StoreError};
use sluice_core::RunId;
use std::sync::Arc;
use std::time::Duration;

/// Store key of a run's event channel.
pub fn channel_key(run_id: &RunId) -> String {
    format!("run:{run_id}:events")
}

/// Handle to one run's event channel.
#[derive(Clone)]
pub struct StreamChannel {
    store: Arc<dyn ChannelStore>,
    run_id: RunId,
    key: String,
}

impl StreamChannel {
    pub fn new(store: Arc<dyn ChannelStore>, run_id: RunId) -> Self {
        let key = channel_key(&run_id);
        Self { store, run_id, key }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn create(&self) -> Result<(), StoreError> {
        self.store.create(&self.key).await
    }

    pub async fn append(&self, payload: impl Into<Vec<u8>>) -> Result<String, StoreError> {
        self.store.append(&self.key, payload.into()).await
    }

    pub async fn read_all(&self) -> Result<Vec<Entry>, StoreError> {
        self.store.range(&self.key).await
    }

    pub async fn read_after(&self, after: Option<&str>, wait: Duration) -> Result<Vec<Entry>, StoreError> {
        self.store.read_after(&self.key, after, wait).await
    }

    /// Drop every entry up to and including `boundary_id`.
    pub async fn trim_through(&self, boundary_id: &str) -> Result<usize, StoreError> {
        self.store.trim_before(&self.key, &trim_floor(boundary_id)).await
    }

    pub async fn expire(&self, ttl: Duration) -> Result<(), StoreError> {
        self.store.expire(&self.key, ttl).await
    }

    pub async fn len(&self) -> Result<usize, StoreError> {
        self.store.len(&self.key).await
    }
}

impl std::fmt::Debug for StreamChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamChannel").field("key", &self.key).finish_non_exhaustive()
    }
}
