// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stop specs

use crate::prelude::*;
use sluice_engine::ControlSignal;

#[tokio::test(start_paused = true)]
async fn stopping_a_run_closes_attached_clients() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();
    harness.append(&run_id, json!({ "type": "assistant", "content": "thinking" })).await;

    let mut session = harness.services.gateway().spawn(run_id.clone());
    assert!(matches!(session.next_frame().await, Some(Frame::Event { .. })));

    let status = harness.services.dispatcher().stop_run(&run_id, Some("user")).await.unwrap();
    assert_eq!(status, RunStatus::Stopped);

    let (frames, outcome) = session.collect().await;
    assert_eq!(kinds(&frames).last().map(String::as_str), Some("status:stopped"));
    assert_eq!(outcome, GatewayOutcome::Terminal(RunStatus::Stopped));
    assert_eq!(harness.run_status(&run_id), RunStatus::Stopped);
    assert_eq!(harness.memory.control.published(), vec![(run_id, ControlSignal::Stop)]);
}

#[tokio::test]
async fn stopping_a_finished_run_changes_nothing() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();
    harness.services.dispatcher().registry().set_status(&run_id, RunStatus::Completed, None).await.unwrap();

    let status = harness.services.dispatcher().stop_run(&run_id, None).await.unwrap();

    assert_eq!(status, RunStatus::Completed);
    assert_eq!(harness.run_status(&run_id), RunStatus::Completed);
    assert_eq!(harness.channel_len(&run_id).await, 0);
}
