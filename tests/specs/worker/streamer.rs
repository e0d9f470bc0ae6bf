// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job stream specs
//!
//! Stream failures are retried with a back-off delay seeded by the previous
//! delay, and closing the worker cancels a pending reopen.

use crate::prelude::*;
use parking_lot::Mutex;

fn doubling_backoff(seeds: Arc<Mutex<Vec<Duration>>>) -> Arc<dyn zb_core::BackoffSupplier> {
    Arc::new(move |current: Duration| {
        seeds.lock().push(current);
        if current.is_zero() {
            Duration::from_secs(1)
        } else {
            current * 2
        }
    })
}

fn stream_opens(gateway: &FakeGateway) -> usize {
    gateway.calls_to(Method::StreamActivatedJobs).len()
}

#[tokio::test(start_paused = true)]
async fn failed_streams_back_off_and_close_cancels_the_pending_reopen() {
    let gateway = FakeGateway::new();
    gateway.push_stream(StreamScript::Fail(RpcError::unavailable("broker down")));
    gateway.push_stream(StreamScript::Fail(RpcError::unavailable("broker down")));
    let seeds = Arc::new(Mutex::new(Vec::new()));

    let worker = JobWorkerBuilder::new(JobClient::new(Arc::new(gateway.clone())))
        .job_type("payment")
        .handler(|_client: JobClient, _job: Job| async {})
        .backoff(doubling_backoff(seeds.clone()))
        .stream_enabled(true)
        .open();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(stream_opens(&gateway), 1);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(stream_opens(&gateway), 2, "reopened after one second");

    tokio::time::sleep(Duration::from_millis(500)).await;
    worker.close().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(stream_opens(&gateway), 2, "no reopen after close");
    assert_eq!(*seeds.lock(), vec![Duration::ZERO, Duration::from_secs(1)]);
}

#[tokio::test]
async fn streamed_jobs_reach_the_handler() {
    let gateway = FakeGateway::new();
    gateway.push_stream(StreamScript::Jobs {
        jobs: wire_jobs(7, 3, "payment"),
        end: zb_gateway::StreamEnd::Hold,
    });
    let seen = Arc::new(Mutex::new(Vec::new()));

    let worker = {
        let seen = seen.clone();
        JobWorkerBuilder::new(JobClient::new(Arc::new(gateway.clone())))
            .job_type("payment")
            .handler(move |_client: JobClient, job: Job| {
                let seen = seen.clone();
                async move { seen.lock().push(job.key.get()) }
            })
            .concurrency(1)
            .stream_enabled(true)
            .open()
    };

    eventually("streamed jobs handled", || seen.lock().len() == 3).await;
    worker.close().await;

    assert_eq!(*seen.lock(), vec![7, 8, 9]);
    assert!(gateway.activate_requests().iter().all(|r| r.job_type == "payment"));
}

#[tokio::test]
async fn clean_stream_end_reopens_without_delay() {
    let gateway = FakeGateway::new();
    gateway.push_stream(StreamScript::Jobs {
        jobs: Vec::new(),
        end: zb_gateway::StreamEnd::Close,
    });
    let seeds = Arc::new(Mutex::new(Vec::new()));

    let worker = JobWorkerBuilder::new(JobClient::new(Arc::new(gateway.clone())))
        .job_type("payment")
        .handler(|_client: JobClient, _job: Job| async {})
        .backoff(doubling_backoff(seeds.clone()))
        .stream_enabled(true)
        .open();

    within(gateway.wait_for_calls(Method::StreamActivatedJobs, 2)).await;
    worker.close().await;

    assert!(seeds.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pushed_job_is_not_held_back_by_a_long_poll() {
    let gateway = FakeGateway::new();
    gateway.long_poll(true);
    gateway.push_stream(StreamScript::Jobs {
        jobs: wire_jobs(42, 1, "payment"),
        end: zb_gateway::StreamEnd::Hold,
    });
    let started = tokio::time::Instant::now();
    let handled_after = Arc::new(Mutex::new(None));

    let worker = {
        let handled_after = handled_after.clone();
        JobWorkerBuilder::new(JobClient::new(Arc::new(gateway.clone())))
            .job_type("payment")
            .handler(move |_client: JobClient, _job: Job| {
                let handled_after = handled_after.clone();
                async move { *handled_after.lock() = Some(started.elapsed()) }
            })
            .stream_enabled(true)
            .open()
    };

    tokio::time::sleep(Duration::from_secs(1)).await;
    let delay = *handled_after.lock();
    worker.close().await;

    assert!(
        delay.is_some_and(|d| d < Duration::from_millis(500)),
        "streamed job handled after {delay:?}"
    );
}
