// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process [`ChannelStore`].

use crate::entry::{Entry, EntryId};
use crate::store::{ChannelStore, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use sluice_core::{Clock, SystemClock};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Store operation, for fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    Append,
    Read,
    Trim,
    Expire,
}

#[derive(Default)]
struct Log {
    entries: VecDeque<(EntryId, Entry)>,
    last_id: Option<EntryId>,
    expires_at: Option<Instant>,
}

impl Log {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    fn next_id(&self, now_ms: u64) -> EntryId {
        match self.last_id {
            Some(last) if now_ms <= last.ms => last.successor(),
            _ => EntryId::new(now_ms, 0),
        }
    }

    fn after(&self, after: Option<EntryId>) -> Vec<Entry> {
        self.entries
            .iter()
            .filter(|(id, _)| match after {
                Some(after) => *id > after,
                None => true,
            })
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}

#[derive(Default)]
struct State {
    logs: HashMap<String, Log>,
    failing: HashSet<StoreOp>,
}

impl State {
    /// Live log for `key`, dropping it first if it has expired.
    fn live(&mut self, key: &str, now: Instant) -> Option<&mut Log> {
        if self.logs.get(key).is_some_and(|log| log.is_expired(now)) {
            self.logs.remove(key);
        }
        self.logs.get_mut(key)
    }
}

/// [`ChannelStore`] kept in memory and shared by clones.
///
/// Entry IDs take their millisecond part from the clock, so a
/// [`sluice_core::FakeClock`] gives deterministic IDs.
#[derive(Clone)]
pub struct MemoryChannelStore<C: Clock = SystemClock> {
    state: Arc<Mutex<State>>,
    appended: Arc<Notify>,
    clock: C,
}

impl MemoryChannelStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryChannelStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryChannelStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { state: Arc::new(Mutex::new(State::default())), appended: Arc::new(Notify::new()), clock }
    }

    pub fn exists(&self, key: &str) -> bool {
        self.state.lock().live(key, Instant::now()).is_some()
    }

    /// Make `op` fail until cleared.
    #[cfg(any(test, feature = "test-support"))]
    pub fn set_failing(&self, op: StoreOp, failing: bool) {
        let mut state = self.state.lock();
        if failing {
            state.failing.insert(op);
        } else {
            state.failing.remove(&op);
        }
    }

    fn check(&self, op: StoreOp) -> Result<(), StoreError> {
        if self.state.lock().failing.contains(&op) {
            return Err(StoreError::Unavailable(format!("injected {op:?} failure")));
        }
        Ok(())
    }

    fn snapshot_after(&self, key: &str, after: Option<EntryId>) -> Vec<Entry> {
        let mut state = self.state.lock();
        state.live(key, Instant::now()).map(|log| log.after(after)).unwrap_or_default()
    }
}

fn parse_id(id: &str) -> Result<EntryId, StoreError> {
    id.parse().map_err(|_| StoreError::InvalidId(id.to_string()))
}

#[async_trait]
impl<C: Clock> ChannelStore for MemoryChannelStore<C> {
    async fn create(&self, key: &str) -> Result<(), StoreError> {
        self.check(StoreOp::Create)?;
        let mut state = self.state.lock();
        if state.live(key, Instant::now()).is_none() {
            state.logs.insert(key.to_string(), Log::default());
        }
        Ok(())
    }

    async fn append(&self, key: &str, payload: Vec<u8>) -> Result<String, StoreError> {
        self.check(StoreOp::Append)?;
        let id = {
            let now = Instant::now();
            let mut state = self.state.lock();
            if state.live(key, now).is_none() {
                state.logs.insert(key.to_string(), Log::default());
            }
            let log = state.logs.entry(key.to_string()).or_default();
            let id = log.next_id(self.clock.epoch_ms());
            log.last_id = Some(id);
            log.entries.push_back((id, Entry::new(id.to_string(), payload)));
            id
        };
        self.appended.notify_waiters();
        Ok(id.to_string())
    }

    async fn range(&self, key: &str) -> Result<Vec<Entry>, StoreError> {
        self.check(StoreOp::Read)?;
        Ok(self.snapshot_after(key, None))
    }

    async fn read_after(
        &self,
        key: &str,
        after: Option<&str>,
        wait: Duration,
    ) -> Result<Vec<Entry>, StoreError> {
        self.check(StoreOp::Read)?;
        let after = after.map(parse_id).transpose()?;
        let deadline = Instant::now() + wait;
        loop {
            // Register before looking so an append between the look and the
            // wait still wakes us.
            let appended = self.appended.notified();
            tokio::pin!(appended);
            appended.as_mut().enable();

            let entries = self.snapshot_after(key, after);
            if !entries.is_empty() {
                return Ok(entries);
            }
            if tokio::time::timeout_at(deadline, appended).await.is_err() {
                return Ok(Vec::new());
            }
            self.check(StoreOp::Read)?;
        }
    }

    async fn trim_before(&self, key: &str, min_id: &str) -> Result<usize, StoreError> {
        self.check(StoreOp::Trim)?;
        let min_id = parse_id(min_id)?;
        let mut state = self.state.lock();
        let Some(log) = state.live(key, Instant::now()) else {
            return Ok(0);
        };
        let before = log.entries.len();
        while log.entries.front().is_some_and(|(id, _)| *id < min_id) {
            log.entries.pop_front();
        }
        Ok(before - log.entries.len())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        self.check(StoreOp::Expire)?;
        let mut state = self.state.lock();
        if let Some(log) = state.live(key, Instant::now()) {
            log.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn len(&self, key: &str) -> Result<usize, StoreError> {
        self.check(StoreOp::Read)?;
        let mut state = self.state.lock();
        Ok(state.live(key, Instant::now()).map_or(0, |log| log.entries.len()))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
