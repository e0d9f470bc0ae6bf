// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::client::JobClient;
use async_trait::async_trait;
use std::future::Future;
use zb_core::Job;

/// User code run once per activated job.
///
/// The handler reports the outcome itself through the client
/// (complete, fail or throw an error). Returning frees the slot.
#[async_trait]
pub trait JobHandler: Send + Sync + 'static {
    async fn handle(&self, client: JobClient, job: Job);
}

#[async_trait]
impl<F, Fut> JobHandler for F
where
    F: Fn(JobClient, Job) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, client: JobClient, job: Job) {
        (self)(client, job).await
    }
}
