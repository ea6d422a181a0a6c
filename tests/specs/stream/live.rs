// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live tail specs
//!
//! Verify a client attached to a fresh run sees the worker's output as it
//! is appended, in order, and the stream closes on the terminal status.

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn fresh_run_goes_straight_to_live_tail() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();
    let mut session = harness.services.gateway().spawn(run_id.clone());

    // Empty catch-up: the first thing the client sees is a keep-alive
    assert_eq!(session.next_frame().await, Some(Frame::Ping));

    let job = harness.take_job();
    let writer = harness.services.writer(job.run_id);
    writer.response_start().await.unwrap();
    writer.response_end().await.unwrap();
    writer.finish(RunStatus::Completed, None).await.unwrap();

    let (frames, outcome) = session.collect().await;
    assert_eq!(kinds(&frames), vec!["llm_response_start", "llm_response_end", "status:completed"]);
    assert_eq!(outcome, GatewayOutcome::Terminal(RunStatus::Completed));
}

#[tokio::test(start_paused = true)]
async fn frames_are_server_sent_events() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();
    harness.append(&run_id, start()).await;
    harness.append(&run_id, status("failed")).await;

    let (frames, _) = harness.services.gateway().spawn(run_id).collect().await;
    let wire: String = frames.iter().map(Frame::encode).collect();

    let bodies: Vec<serde_json::Value> = wire
        .split_terminator("\n\n")
        .map(|frame| serde_json::from_str(frame.strip_prefix("data: ").unwrap()).unwrap())
        .collect();
    assert_eq!(bodies, vec![start(), status("failed")]);
    assert!(wire.ends_with("}\n\n"));
}

#[tokio::test(start_paused = true)]
async fn appends_between_catch_up_and_tail_are_not_lost() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();
    for i in 0..3 {
        harness.append(&run_id, json!({ "type": "assistant", "seq": i })).await;
    }

    let mut session = harness.services.gateway().spawn(run_id.clone());
    for _ in 0..3 {
        session.next_frame().await.unwrap();
    }
    for i in 3..6 {
        harness.append(&run_id, json!({ "type": "assistant", "seq": i })).await;
    }
    harness.append(&run_id, status("completed")).await;

    let (frames, _) = session.collect().await;
    let seqs: Vec<i64> = frames
        .iter()
        .filter_map(|f| serde_json::from_str::<serde_json::Value>(&f.json()).ok()?["seq"].as_i64())
        .collect();
    assert_eq!(seqs, vec![3, 4, 5]);
}

#[tokio::test(start_paused = true)]
async fn idle_stream_ends_with_error_frame() {
    let mut config = Config::default();
    config.gateway.poll_wait_ms = 1_000;
    config.gateway.max_idle_secs = 3;
    let harness = Harness::with_config(config);
    let run_id = harness.start().await.unwrap();

    let (frames, outcome) = harness.services.gateway().spawn(run_id).collect().await;

    assert_eq!(outcome, GatewayOutcome::IdleTimeout);
    assert_eq!(kinds(&frames), vec!["ping", "ping", "status:error"]);
}

#[tokio::test(start_paused = true)]
async fn store_failure_mid_tail_is_reported_not_silent() {
    let harness = Harness::new();
    let run_id = harness.start().await.unwrap();
    let mut session = harness.services.gateway().spawn(run_id.clone());
    assert_eq!(session.next_frame().await, Some(Frame::Ping));

    harness.memory.channels.set_failing(StoreOp::Read, true);

    let (frames, outcome) = session.collect().await;
    assert_eq!(kinds(&frames).last().map(String::as_str), Some("status:error"));
    assert!(matches!(outcome, GatewayOutcome::Errored(_)));
    // The run itself is unaffected
    assert_eq!(harness.run_status(&run_id), RunStatus::Running);
}
