// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replay specs
//!
//! Verify reconnecting clients see the same history in the same order,
//! and that concurrent readers do not disturb each other.

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn replay_is_ordered_and_repeatable() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();
    for i in 0..20 {
        harness.append(&run_id, json!({ "type": "assistant", "seq": i })).await;
    }
    harness.append(&run_id, status("completed")).await;

    let (first, _) = harness.services.gateway().spawn(run_id.clone()).collect().await;
    let (second, _) = harness.services.gateway().spawn(run_id).collect().await;

    assert_eq!(first.len(), 21);
    assert_eq!(first, second);
    let ids: Vec<&str> = first
        .iter()
        .filter_map(|f| match f {
            Frame::Event { id, .. } => Some(id.as_str()),
            _ => None,
        })
        .collect();
    let mut sorted = ids.clone();
    sorted.sort_by_key(|id| id.parse::<sluice_stream::EntryId>().unwrap());
    assert_eq!(ids, sorted);
}

#[tokio::test(start_paused = true)]
async fn concurrent_readers_each_see_the_full_live_stream() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();

    let mut early = harness.services.gateway().spawn(run_id.clone());
    let mut late = harness.services.gateway().spawn(run_id.clone());
    assert_eq!(early.next_frame().await, Some(Frame::Ping));
    assert_eq!(late.next_frame().await, Some(Frame::Ping));

    let writer = harness.services.writer(run_id.clone());
    writer.response_start().await.unwrap();
    writer.append_json(&json!({ "type": "assistant", "content": "hello" })).await.unwrap();
    writer.response_end().await.unwrap();
    writer.finish(RunStatus::Completed, None).await.unwrap();

    let (early_frames, early_outcome) = early.collect().await;
    let (late_frames, late_outcome) = late.collect().await;
    let expected = vec!["llm_response_start", "assistant", "llm_response_end", "status:completed"];
    let events = |frames: &[Frame]| -> Vec<String> {
        kinds(frames).into_iter().filter(|k| k != "ping").collect()
    };
    assert_eq!(events(&early_frames), expected);
    assert_eq!(events(&late_frames), expected);
    assert_eq!(early_outcome, GatewayOutcome::Terminal(RunStatus::Completed));
    assert_eq!(late_outcome, GatewayOutcome::Terminal(RunStatus::Completed));
}

#[tokio::test(start_paused = true)]
async fn disconnecting_one_reader_leaves_the_others() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();
    harness.append(&run_id, json!({ "type": "assistant" })).await;

    let leaving = harness.services.gateway().spawn(run_id.clone());
    let mut staying = harness.services.gateway().spawn(run_id.clone());
    drop(leaving);

    assert!(matches!(staying.next_frame().await, Some(Frame::Event { .. })));
    harness.append(&run_id, status("completed")).await;
    let (_, outcome) = staying.collect().await;
    assert_eq!(outcome, GatewayOutcome::Terminal(RunStatus::Completed));
    assert_eq!(harness.channel_len(&run_id).await, 2);
}
