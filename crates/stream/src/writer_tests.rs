// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::envelope::{BoundaryRole, Envelope};
use crate::memory::MemoryChannelStore;

fn writer(store: &MemoryChannelStore) -> ChannelWriter {
    ChannelWriter::new(Arc::new(store.clone()), RunId::from_string("run-w"), Duration::from_secs(600))
}

#[tokio::test]
async fn writes_boundary_and_status_events() {
    let store = MemoryChannelStore::new();
    let writer = writer(&store);
    writer.response_start().await.unwrap();
    writer.append_json(&json!({ "type": "assistant", "content": "x" })).await.unwrap();
    writer.response_end().await.unwrap();
    writer.status(RunStatus::Completed, Some("done")).await.unwrap();

    let roles: Vec<_> = writer
        .channel()
        .read_all()
        .await
        .unwrap()
        .iter()
        .map(|e| Envelope::parse(&e.payload).boundary_role())
        .collect();
    assert_eq!(
        roles,
        vec![BoundaryRole::Open, BoundaryRole::Neutral, BoundaryRole::Close, BoundaryRole::Terminal]
    );
}

#[tokio::test]
async fn status_carries_optional_message() {
    let store = MemoryChannelStore::new();
    let writer = writer(&store);
    writer.status(RunStatus::Failed, Some("boom")).await.unwrap();
    writer.status(RunStatus::Running, None).await.unwrap();

    let entries = writer.channel().read_all().await.unwrap();
    let first: Value = serde_json::from_slice(&entries[0].payload).unwrap();
    let second: Value = serde_json::from_slice(&entries[1].payload).unwrap();
    assert_eq!(first, json!({ "type": "status", "status": "failed", "message": "boom" }));
    assert_eq!(second, json!({ "type": "status", "status": "running" }));
}

#[tokio::test(start_paused = true)]
async fn finish_applies_retention() {
    let store = MemoryChannelStore::new();
    let writer = writer(&store);
    writer.finish(RunStatus::Completed, None).await.unwrap();

    let key = writer.channel().key().to_string();
    assert_eq!(key, "run:run-w:events");
    assert!(store.exists(&key));
    tokio::time::advance(Duration::from_secs(601)).await;
    assert!(!store.exists(&key));
}

#[tokio::test]
async fn finish_survives_expire_failure() {
    let store = MemoryChannelStore::new();
    store.set_failing(crate::memory::StoreOp::Expire, true);
    let writer = writer(&store);
    assert!(writer.finish(RunStatus::Stopped, None).await.is_ok());
}
