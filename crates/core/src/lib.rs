// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sluice-core: shared data model for run dispatch, admission and streaming

pub mod macros;

pub mod clock;
pub mod id;
pub mod run;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use id::{AccountId, AgentId, ProjectId, RunId, ThreadId};
#[cfg(any(test, feature = "test-support"))]
pub use run::RunBuilder;
pub use run::{InvalidTransition, ParseStatusError, Run, RunStatus, META_MODEL, META_REQUESTER};
