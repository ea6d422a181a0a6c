// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

/// Proptest strategies for core types.
pub mod strategies {
    use crate::run::RunStatus;
    use proptest::prelude::*;

    pub fn arb_run_status() -> impl Strategy<Value = RunStatus> {
        prop_oneof![
            Just(RunStatus::Running),
            Just(RunStatus::Completed),
            Just(RunStatus::Failed),
            Just(RunStatus::Stopped),
            Just(RunStatus::Error),
        ]
    }

    pub fn arb_terminal_status() -> impl Strategy<Value = RunStatus> {
        prop_oneof![
            Just(RunStatus::Completed),
            Just(RunStatus::Failed),
            Just(RunStatus::Stopped),
            Just(RunStatus::Error),
        ]
    }
}
