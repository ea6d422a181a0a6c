// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel entries and their `<millis>-<seq>` identifiers.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Position of an entry in a channel.
///
/// Ordered by millisecond timestamp, then by per-millisecond sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId {
    pub ms: u64,
    pub seq: u64,
}

impl EntryId {
    pub const ZERO: EntryId = EntryId { ms: 0, seq: 0 };

    pub fn new(ms: u64, seq: u64) -> Self {
        Self { ms, seq }
    }

    /// Smallest ID strictly greater than this one.
    pub fn successor(self) -> Self {
        match self.seq.checked_add(1) {
            Some(seq) => Self { ms: self.ms, seq },
            None => Self { ms: self.ms.saturating_add(1), seq: 0 },
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed entry id '{0}' (expected <millis>-<seq>)")]
pub struct ParseEntryIdError(pub String);

impl FromStr for EntryId {
    type Err = ParseEntryIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseEntryIdError(s.to_string());
        let (ms, seq) = s.split_once('-').ok_or_else(err)?;
        Ok(Self { ms: ms.parse().map_err(|_| err())?, seq: seq.parse().map_err(|_| err())? })
    }
}

/// Minimum ID to keep when trimming everything up to and including
/// `boundary`.
///
/// An unparseable boundary is used as-is, which keeps the boundary entry
/// itself and trims only what precedes it.
pub fn trim_floor(boundary: &str) -> String {
    match boundary.parse::<EntryId>() {
        Ok(id) => id.successor().to_string(),
        Err(_) => boundary.to_string(),
    }
}

/// One appended event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Store-assigned ID in `<millis>-<seq>` form
    pub id: String,
    /// One UTF-8 JSON event, opaque to the channel
    pub payload: Vec<u8>,
}

impl Entry {
    pub fn new(id: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self { id: id.into(), payload: payload.into() }
    }

    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
