// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trim specs
//!
//! Verify catch-up compacts the channel only through fully closed
//! responses, and never while a response is open.

use crate::prelude::*;

async fn attach_and_settle(harness: &Harness, run_id: &RunId, replayed: usize) -> sluice_stream::GatewaySession {
    let mut session = harness.services.gateway().spawn(run_id.clone());
    for _ in 0..replayed {
        assert!(matches!(session.next_frame().await, Some(Frame::Event { .. })));
    }
    // The first ping comes after the trim decision
    assert_eq!(session.next_frame().await, Some(Frame::Ping));
    session
}

#[tokio::test(start_paused = true)]
async fn two_closed_cycles_are_trimmed_entirely() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();
    for event in [start(), end(), start(), end()] {
        harness.append(&run_id, event).await;
    }

    let session = attach_and_settle(&harness, &run_id, 4).await;
    assert_eq!(harness.channel_len(&run_id).await, 0);

    harness.append(&run_id, status("completed")).await;
    let (frames, outcome) = session.collect().await;
    assert_eq!(kinds(&frames), vec!["status:completed"]);
    assert_eq!(outcome, GatewayOutcome::Terminal(RunStatus::Completed));
}

#[tokio::test(start_paused = true)]
async fn open_response_at_end_of_batch_blocks_trim() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();
    for event in [start(), end(), start()] {
        harness.append(&run_id, event).await;
    }

    let session = attach_and_settle(&harness, &run_id, 3).await;
    assert_eq!(harness.channel_len(&run_id).await, 3);
    session.cancel();
}

#[tokio::test(start_paused = true)]
async fn unmatched_response_end_blocks_trim() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();
    for event in [start(), end(), end(), json!({ "type": "tool_result" })] {
        harness.append(&run_id, event).await;
    }

    let session = attach_and_settle(&harness, &run_id, 4).await;
    assert_eq!(harness.channel_len(&run_id).await, 4);
    session.cancel();
}

#[tokio::test(start_paused = true)]
async fn trim_keeps_everything_after_the_boundary() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();
    for event in [start(), json!({ "type": "assistant" }), end(), json!({ "type": "tool_result" })] {
        harness.append(&run_id, event).await;
    }

    let session = attach_and_settle(&harness, &run_id, 4).await;
    session.cancel();

    // A later client replays only what followed the boundary
    harness.append(&run_id, status("completed")).await;
    let (frames, _) = harness.services.gateway().spawn(run_id).collect().await;
    assert_eq!(kinds(&frames), vec!["tool_result", "status:completed"]);
}

#[tokio::test(start_paused = true)]
async fn terminal_catch_up_is_left_for_later_readers() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();
    for event in [start(), end(), status("completed")] {
        harness.append(&run_id, event).await;
    }

    let (first, _) = harness.services.gateway().spawn(run_id.clone()).collect().await;
    assert_eq!(harness.channel_len(&run_id).await, 3);
    let (second, _) = harness.services.gateway().spawn(run_id).collect().await;
    assert_eq!(first, second);
}
