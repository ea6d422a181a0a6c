// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only log store seam.

use crate::entry::Entry;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("channel store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid entry id '{0}'")]
    InvalidId(String),
}

/// External store of per-key append-only logs (Redis-stream semantics).
///
/// IDs are assigned by the store on append and increase strictly within a
/// key. Appending to a missing key creates it. Expired keys vanish along
/// with their entries.
#[async_trait]
pub trait ChannelStore: Send + Sync + 'static {
    /// Ensure the key exists. Idempotent.
    async fn create(&self, key: &str) -> Result<(), StoreError>;

    /// Append one payload and return its ID.
    async fn append(&self, key: &str, payload: Vec<u8>) -> Result<String, StoreError>;

    /// Every entry currently in the log, in order.
    async fn range(&self, key: &str) -> Result<Vec<Entry>, StoreError>;

    /// Entries strictly after `after` (or from the start when `None`),
    /// waiting up to `wait` for at least one to appear.
    ///
    /// Returns an empty batch when the wait elapses.
    async fn read_after(
        &self,
        key: &str,
        after: Option<&str>,
        wait: Duration,
    ) -> Result<Vec<Entry>, StoreError>;

    /// Remove entries whose ID is below `min_id`. Returns how many went.
    async fn trim_before(&self, key: &str, min_id: &str) -> Result<usize, StoreError>;

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    async fn len(&self, key: &str) -> Result<usize, StoreError>;
}
