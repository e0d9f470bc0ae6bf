// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Back-pressure specs
//!
//! A worker never holds more than `max_jobs_active` jobs and never runs
//! more than `concurrency` handlers.

use crate::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

struct Gate {
    permits: Semaphore,
    running: AtomicUsize,
    peak: AtomicUsize,
    started: AtomicUsize,
}

impl Gate {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            permits: Semaphore::new(0),
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            started: AtomicUsize::new(0),
        })
    }

    async fn pass(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn activation_never_exceeds_free_capacity() {
    init_logging();
    let gateway = FakeGateway::new();
    gateway.push_jobs(wire_jobs(1, 10, "payment"));
    let gate = Gate::new();

    let worker = {
        let gate = gate.clone();
        JobWorkerBuilder::new(JobClient::new(Arc::new(gateway.clone())))
            .job_type("payment")
            .handler(move |_client: JobClient, _job: Job| {
                let gate = gate.clone();
                async move { gate.pass().await }
            })
            .max_jobs_active(4)
            .concurrency(2)
            .poll_threshold(1.0)
            .open()
    };

    eventually("two running handlers", || gate.running.load(Ordering::SeqCst) == 2).await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(gateway.pending_jobs(), 6, "exactly four jobs leave the gateway");
    assert_eq!(gateway.activate_requests()[0].max_jobs_to_activate, 4);

    let before = gateway.activate_requests().len();
    gate.permits.add_permits(2);
    eventually("two more jobs activated", || gateway.pending_jobs() == 4).await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    let later: Vec<i32> = gateway.activate_requests()[before..]
        .iter()
        .map(|r| r.max_jobs_to_activate)
        .collect();
    assert!(!later.is_empty());
    assert!(later.iter().all(|n| *n <= 2), "requested {later:?}");
    assert_eq!(gateway.pending_jobs(), 4);
    assert_eq!(gate.peak.load(Ordering::SeqCst), 2);

    gate.permits.add_permits(100);
    worker.close().await;
}

#[tokio::test]
async fn single_slot_handles_a_batch_in_gateway_order() {
    let gateway = FakeGateway::new();
    gateway.push_jobs(wire_jobs(100, 5, "payment"));
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

    let worker = {
        let seen = seen.clone();
        JobWorkerBuilder::new(JobClient::new(Arc::new(gateway.clone())))
            .job_type("payment")
            .handler(move |_client: JobClient, job: Job| {
                let seen = seen.clone();
                async move { seen.lock().push(job.key.get()) }
            })
            .max_jobs_active(8)
            .concurrency(1)
            .open()
    };

    eventually("all jobs handled", || seen.lock().len() == 5).await;
    worker.close().await;

    assert_eq!(*seen.lock(), vec![100, 101, 102, 103, 104]);
}

#[tokio::test]
async fn close_stops_new_handlers() {
    let gateway = FakeGateway::new();
    gateway.push_jobs(wire_jobs(1, 3, "payment"));
    let gate = Gate::new();

    let worker = {
        let gate = gate.clone();
        JobWorkerBuilder::new(JobClient::new(Arc::new(gateway.clone())))
            .job_type("payment")
            .handler(move |_client: JobClient, _job: Job| {
                let gate = gate.clone();
                async move { gate.pass().await }
            })
            .concurrency(1)
            .open()
    };
    eventually("first handler running", || gate.running.load(Ordering::SeqCst) == 1).await;

    let closing = {
        let worker = worker.clone();
        tokio::spawn(async move { worker.close().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!closing.is_finished(), "close waits for the running handler");

    gate.permits.add_permits(10);
    within(closing).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(gate.started.load(Ordering::SeqCst), 1);
    within(worker.close()).await;
}
