// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sluice-stream: per-run event channels and the client-facing gateway.
//!
//! A run's output is an append-only channel of JSON events in an external
//! log store. The worker appends through [`ChannelWriter`]; any number of
//! clients attach through [`StreamGateway`], which replays history, trims
//! the fully closed prefix, and tails new entries until a terminal status.
//!
//! ```text
//!  worker ── ChannelWriter ──► ChannelStore (run:<id>:events) ◄── StreamGateway ──► Frame ──► client
//! ```

mod boundary;
mod channel;
mod entry;
mod envelope;
mod frame;
mod gateway;
mod memory;
mod store;
mod writer;

pub use boundary::BoundaryScan;
pub use channel::{channel_key, StreamChannel};
pub use entry::{trim_floor, Entry, EntryId, ParseEntryIdError};
pub use envelope::{BoundaryRole, Envelope};
pub use frame::Frame;
pub use gateway::{GatewayConfig, GatewayOutcome, GatewaySession, StreamGateway};
pub use memory::{MemoryChannelStore, StoreOp};
pub use store::{ChannelStore, StoreError};
pub use writer::ChannelWriter;
