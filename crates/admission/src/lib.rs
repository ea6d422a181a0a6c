// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sluice-admission: bounds concurrent calls to the upstream model service.
//!
//! Every upstream call holds a [`Slot`] for its whole duration. Slots come
//! from one of two interchangeable strategies:
//!
//! - [`LocalStrategy`]: an in-process semaphore (`local_limit`). Only bounds
//!   this process; treat it as reduced safety in a multi-process deployment.
//! - [`DistributedStrategy`]: a shared counter in an external store
//!   (`global_limit`) with a TTL so crashed holders self-heal. When the store
//!   is unreachable the strategy fails open.
//!
//! ```text
//!  caller ──► AdmissionController::acquire ──► strategy ──► Permit
//!                   │                                         │
//!                   └──────── CallStats ◄──── Slot (RAII) ◄───┘
//! ```

mod config;
mod controller;
mod counter;
mod distributed;
mod error;
mod guarded;
mod local;
mod slot;
mod stats;

pub use config::{AdmissionConfig, AdmissionMode};
pub use controller::{AdmissionController, AdmissionStrategy};
pub use counter::{CounterStore, MemoryCounterStore};
pub use distributed::DistributedStrategy;
pub use error::{AdmissionError, CallError, CounterError};
pub use guarded::GuardedStream;
pub use local::LocalStrategy;
pub use slot::{Permit, Slot};
pub use stats::{CallStats, StatsSnapshot};
