// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission specs
//!
//! Verify the cluster-wide limit holds under contention and that every
//! admitted call gives its slot back.

use crate::prelude::*;
use sluice_admission::CallError;

fn distributed(limit: usize, timeout_secs: u64) -> Harness {
    Harness::with_config(Config {
        admission: AdmissionConfig::default().global_limit(limit).acquire_timeout_secs(timeout_secs),
        ..Config::default()
    })
}

#[tokio::test(start_paused = true)]
async fn one_hundred_fifty_callers_against_a_limit_of_one_hundred() {
    let harness = distributed(100, 1);
    let admission = harness.services.admission().clone();

    let started = tokio::time::Instant::now();
    let attempts: Vec<_> = (0..150)
        .map(|_| {
            let admission = admission.clone();
            tokio::spawn(async move { admission.acquire().await })
        })
        .collect();

    let mut held = Vec::new();
    let mut saturated = 0u64;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(slot) => held.push(slot),
            Err(err) => {
                assert!(err.is_retryable());
                saturated += 1;
            }
        }
    }

    assert!(held.len() <= 100);
    assert!(saturated >= 50);
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(admission.stats().rejected_calls, saturated);
    assert_eq!(admission.global_in_flight().await, Some(held.len() as i64));
}

#[tokio::test(start_paused = true)]
async fn processes_sharing_a_counter_share_the_limit() {
    let (backends, _memory) = Backends::memory();
    let config = Config {
        admission: AdmissionConfig::default().global_limit(3).acquire_timeout_secs(1),
        ..Config::default()
    };
    let process_a = Services::new(config.clone(), backends.clone());
    let process_b = Services::new(config, backends);

    let _a1 = process_a.admission().acquire().await.unwrap();
    let _a2 = process_a.admission().acquire().await.unwrap();
    let _b1 = process_b.admission().acquire().await.unwrap();

    let err = process_b.admission().acquire().await.unwrap_err();
    assert!(matches!(err, AdmissionError::Saturated { limit: 3, .. }));
}

#[tokio::test(start_paused = true)]
async fn within_capacity_nobody_waits_for_saturation() {
    for mode in [AdmissionMode::Local, AdmissionMode::Distributed] {
        let harness = Harness::with_config(Config {
            admission: AdmissionConfig::default().mode(mode).local_limit(5).global_limit(5),
            ..Config::default()
        });
        let admission = harness.services.admission();
        for _ in 0..20 {
            let slots: Vec<_> = acquire_all(admission, 5).await;
            assert_eq!(slots.len(), 5, "{mode} saturated within capacity");
            for slot in slots {
                admission.release(slot).await;
            }
        }
        assert_eq!(admission.stats().rejected_calls, 0);
    }
}

async fn acquire_all(
    admission: &sluice_admission::AdmissionController,
    n: usize,
) -> Vec<sluice_admission::Slot> {
    let mut slots = Vec::with_capacity(n);
    for _ in 0..n {
        slots.push(admission.acquire().await.unwrap());
    }
    slots
}

#[derive(Debug)]
struct ModelDown;

#[tokio::test]
async fn active_calls_return_to_baseline_after_mixed_outcomes() {
    let harness = distributed(4, 1);
    let admission = harness.services.admission().clone();
    let baseline = admission.stats().active_calls;

    for i in 0..12u32 {
        let outcome: Result<u32, CallError<ModelDown>> =
            admission.call(async move { if i % 4 == 0 { Err(ModelDown) } else { Ok(i) } }).await;
        assert_eq!(outcome.is_ok(), i % 4 != 0);
    }

    let cancelled = {
        let admission = admission.clone();
        tokio::spawn(async move {
            admission
                .call(async {
                    std::future::pending::<()>().await;
                    Ok::<_, ModelDown>(())
                })
                .await
        })
    };
    while admission.stats().active_calls == baseline {
        tokio::task::yield_now().await;
    }
    cancelled.abort();
    let _ = cancelled.await;
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }

    assert_eq!(admission.stats().active_calls, baseline);
    assert!(harness.memory.counter.ttl("sluice:llm:active").is_some());
    assert_eq!(admission.global_in_flight().await, Some(0));
}
