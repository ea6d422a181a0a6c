// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sluice-engine: run dispatch and lifecycle.
//!
//! The [`Dispatcher`] turns a job request into a running run:
//!
//! ```text
//! resolve config ─► insert run record ─► invalidate caches (spawned) ─► create channel ─► enqueue
//!       │                  │                                                  │              │
//!     abort              abort                                      mark failed + abort   mark failed + abort
//! ```
//!
//! External collaborators sit behind the traits in this crate, each with
//! an in-memory implementation.

mod cache;
mod control;
mod dispatcher;
mod error;
mod job;
mod queue;
mod registry;
mod resolver;
mod run_store;

pub use cache::{running_runs_key, CacheError, CacheInvalidator, MemoryCacheInvalidator};
pub use control::{ControlBus, ControlError, ControlSignal, MemoryControlBus};
pub use dispatcher::{DispatchDeps, Dispatcher};
pub use error::{DispatchError, StopError};
pub use job::{JobSpec, ResolvedJob, RunJob};
pub use queue::{JobQueue, MemoryJobQueue, QueueError};
pub use registry::RunRegistry;
pub use resolver::{ConfigResolver, ResolveError, StaticConfigResolver};
pub use run_store::{MemoryRunStore, RunStore, RunStoreError};
