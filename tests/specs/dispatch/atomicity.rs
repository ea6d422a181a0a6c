// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch specs
//!
//! Verify a run is never left `running` without queued work, and that a
//! client can attach as soon as dispatch returns.

use crate::prelude::*;

#[tokio::test]
async fn channel_failure_after_record_leaves_run_failed() {
    let harness = Harness::new();
    harness.memory.channels.set_failing(StoreOp::Create, true);

    let err = harness.start().await.unwrap_err();

    assert!(matches!(err, DispatchError::Channel(_)));
    let runs = harness.memory.runs.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert!(harness.memory.queue.is_empty());
}

#[tokio::test]
async fn enqueue_failure_leaves_run_failed() {
    let harness = Harness::new();
    harness.memory.queue.set_failing(Some("broker down"));

    let err = harness.start().await.unwrap_err();

    assert!(matches!(err, DispatchError::Enqueue(_)));
    let runs = harness.memory.runs.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert!(runs[0].error.as_deref().unwrap_or_default().contains("broker down"));
}

#[tokio::test]
async fn record_failure_leaves_nothing_behind() {
    let harness = Harness::new();
    harness.memory.runs.set_unavailable(true);

    assert!(matches!(harness.start().await, Err(DispatchError::RunRecord(_))));
    harness.memory.runs.set_unavailable(false);
    assert!(harness.memory.runs.runs().is_empty());
    assert!(harness.memory.queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn channel_exists_before_the_worker_starts() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();

    assert!(harness.memory.channels.exists(&channel_key(&run_id)));
    assert_eq!(harness.run_status(&run_id), RunStatus::Running);

    // A client attaching before the worker has produced anything just waits
    let mut session = harness.services.gateway().spawn(run_id.clone());
    assert_eq!(session.next_frame().await, Some(Frame::Ping));

    let job = harness.take_job();
    assert_eq!(job.run_id, run_id);
    session.cancel();
    assert_eq!(session.outcome().await, GatewayOutcome::Disconnected);
}
