// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server-sent-event frames delivered to clients.

use crate::entry::Entry;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A channel entry, forwarded verbatim
    Event { id: String, json: String },
    /// Keep-alive sent when the tail wait elapses with nothing new
    Ping,
    /// Synthetic terminal error produced by the gateway itself
    Error { message: String },
}

impl Frame {
    pub fn event(entry: &Entry) -> Self {
        Frame::Event { id: entry.id.clone(), json: entry.text().into_owned() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Frame::Error { message: message.into() }
    }

    /// JSON body of the frame.
    pub fn json(&self) -> String {
        match self {
            Frame::Event { json, .. } => json.clone(),
            Frame::Ping => json!({ "type": "ping" }).to_string(),
            Frame::Error { message } => {
                json!({ "type": "status", "status": "error", "message": message }).to_string()
            }
        }
    }

    /// Wire encoding: `data: <json>\n\n`.
    ///
    /// Payloads spanning several lines get one `data:` field per line,
    /// which clients join back with `\n`.
    pub fn encode(&self) -> String {
        let json = self.json();
        let mut out = String::with_capacity(json.len() + 8);
        for line in json.split('\n') {
            out.push_str("data: ");
            out.push_str(line.strip_suffix('\r').unwrap_or(line));
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
