// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sluice_core::FakeClock;

const KEY: &str = "run:run-test:events";

fn store() -> (MemoryChannelStore<FakeClock>, FakeClock) {
    let clock = FakeClock::new();
    (MemoryChannelStore::with_clock(clock.clone()), clock)
}

fn ids(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.id.as_str()).collect()
}

#[tokio::test]
async fn ids_increase_within_and_across_milliseconds() {
    let (store, clock) = store();
    let a = store.append(KEY, b"a".to_vec()).await.unwrap();
    let b = store.append(KEY, b"b".to_vec()).await.unwrap();
    clock.advance(Duration::from_millis(3));
    let c = store.append(KEY, b"c".to_vec()).await.unwrap();

    assert_eq!(a, "1700000000000-0");
    assert_eq!(b, "1700000000000-1");
    assert_eq!(c, "1700000000003-0");
}

#[tokio::test]
async fn ids_stay_monotonic_when_wall_clock_steps_back() {
    let (store, clock) = store();
    store.append(KEY, b"a".to_vec()).await.unwrap();
    clock.set_epoch_ms(1_600_000_000_000);
    let b = store.append(KEY, b"b".to_vec()).await.unwrap();
    assert_eq!(b, "1700000000000-1");
}

#[tokio::test]
async fn create_is_idempotent_and_keeps_entries() {
    let (store, _) = store();
    store.create(KEY).await.unwrap();
    store.append(KEY, b"a".to_vec()).await.unwrap();
    store.create(KEY).await.unwrap();
    assert!(store.exists(KEY));
    assert_eq!(store.len(KEY).await.unwrap(), 1);
}

#[tokio::test]
async fn missing_key_reads_empty() {
    let (store, _) = store();
    assert!(store.range("nope").await.unwrap().is_empty());
    assert_eq!(store.len("nope").await.unwrap(), 0);
    assert_eq!(store.trim_before("nope", "1-0").await.unwrap(), 0);
}

#[tokio::test]
async fn read_after_returns_only_later_entries() {
    let (store, _) = store();
    let first = store.append(KEY, b"a".to_vec()).await.unwrap();
    store.append(KEY, b"b".to_vec()).await.unwrap();

    let all = store.read_after(KEY, None, Duration::ZERO).await.unwrap();
    assert_eq!(all.len(), 2);
    let later = store.read_after(KEY, Some(&first), Duration::ZERO).await.unwrap();
    assert_eq!(ids(&later), vec!["1700000000000-1"]);
}

#[tokio::test]
async fn read_after_rejects_malformed_cursor() {
    let (store, _) = store();
    let err = store.read_after(KEY, Some("garbage"), Duration::ZERO).await.unwrap_err();
    assert_eq!(err, StoreError::InvalidId("garbage".to_string()));
}

#[tokio::test(start_paused = true)]
async fn read_after_times_out_empty() {
    let (store, _) = store();
    store.create(KEY).await.unwrap();
    let started = Instant::now();
    let batch = store.read_after(KEY, None, Duration::from_secs(5)).await.unwrap();
    assert!(batch.is_empty());
    assert!(started.elapsed() >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn read_after_wakes_on_append() {
    let (store, _) = store();
    let reader = {
        let store = store.clone();
        tokio::spawn(async move { store.read_after(KEY, None, Duration::from_secs(60)).await })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    store.append(KEY, br#"{"type":"x"}"#.to_vec()).await.unwrap();

    let batch = reader.await.unwrap().unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].text(), r#"{"type":"x"}"#);
}

#[tokio::test]
async fn trim_removes_entries_below_min_id() {
    let (store, _) = store();
    for payload in ["a", "b", "c", "d"] {
        store.append(KEY, payload.as_bytes().to_vec()).await.unwrap();
    }
    let removed = store.trim_before(KEY, "1700000000000-2").await.unwrap();
    assert_eq!(removed, 2);
    let left = store.range(KEY).await.unwrap();
    assert_eq!(ids(&left), vec!["1700000000000-2", "1700000000000-3"]);
}

#[tokio::test]
async fn trim_does_not_reset_id_sequence() {
    let (store, _) = store();
    store.append(KEY, b"a".to_vec()).await.unwrap();
    store.trim_before(KEY, "1700000000000-1").await.unwrap();
    let next = store.append(KEY, b"b".to_vec()).await.unwrap();
    assert_eq!(next, "1700000000000-1");
}

#[tokio::test(start_paused = true)]
async fn expired_channel_disappears() {
    let (store, _) = store();
    store.append(KEY, b"a".to_vec()).await.unwrap();
    store.expire(KEY, Duration::from_secs(600)).await.unwrap();

    tokio::time::advance(Duration::from_secs(599)).await;
    assert_eq!(store.len(KEY).await.unwrap(), 1);
    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(store.len(KEY).await.unwrap(), 0);
    assert!(!store.exists(KEY));
}

#[tokio::test]
async fn injected_faults_surface_as_unavailable() {
    for op in [StoreOp::Create, StoreOp::Append, StoreOp::Read, StoreOp::Trim, StoreOp::Expire] {
        let (store, _) = store();
        store.set_failing(op, true);
        let result = match op {
            StoreOp::Create => store.create(KEY).await,
            StoreOp::Append => store.append(KEY, Vec::new()).await.map(drop),
            StoreOp::Read => store.range(KEY).await.map(drop),
            StoreOp::Trim => store.trim_before(KEY, "1-0").await.map(drop),
            StoreOp::Expire => store.expire(KEY, Duration::from_secs(1)).await,
        };
        assert!(matches!(result, Err(StoreError::Unavailable(_))), "{op:?} did not fail");

        store.set_failing(op, false);
        assert!(store.range(KEY).await.is_ok());
    }
}
