// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Long-poll specs
//!
//! Activation requests ask the gateway to give up before the client does.

use crate::prelude::*;

async fn first_request_timeout(request_timeout: Duration) -> i64 {
    let gateway = FakeGateway::new();
    let worker = JobWorkerBuilder::new(JobClient::new(Arc::new(gateway.clone())))
        .job_type("payment")
        .handler(|_client: JobClient, _job: Job| async {})
        .request_timeout(request_timeout)
        .open();
    within(gateway.wait_for_calls(Method::ActivateJobs, 1)).await;
    worker.close().await;
    gateway.activate_requests()[0].request_timeout
}

#[tokio::test]
async fn long_deadline_loses_the_full_offset() {
    assert_eq!(first_request_timeout(Duration::from_secs(60)).await, 50_000);
}

#[tokio::test]
async fn short_deadline_loses_a_tenth() {
    assert_eq!(first_request_timeout(Duration::from_secs(5)).await, 4_500);
}

#[test]
fn missing_deadline_disables_long_polling() {
    assert_eq!(zb_core::long_poll_millis(None), -1);
}

#[tokio::test]
async fn activation_call_carries_the_client_deadline() {
    let gateway = FakeGateway::new();
    let worker = JobWorkerBuilder::new(JobClient::new(Arc::new(gateway.clone())))
        .job_type("payment")
        .handler(|_client: JobClient, _job: Job| async {})
        .request_timeout(Duration::from_secs(30))
        .open();
    within(gateway.wait_for_calls(Method::ActivateJobs, 1)).await;
    worker.close().await;

    let call = &gateway.calls_to(Method::ActivateJobs)[0];
    assert_eq!(call.timeout, Some(Duration::from_secs(30)));
}
