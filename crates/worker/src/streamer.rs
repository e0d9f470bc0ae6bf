// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Long-lived `StreamActivatedJobs` push stream.
//!
//! A single task owns the stream, so at most one open is ever in flight.
//! A clean end reopens at once; an error reopens after a back-off delay
//! seeded with the previous delay.

use crate::client::JobClient;
use crate::remaining::RemainingJobs;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use zb_core::{BackoffSupplier, Job};
use zb_gateway::{RpcError, StreamActivatedJobsRequest};

pub(crate) struct JobStreamer {
    pub(crate) client: JobClient,
    pub(crate) request: StreamActivatedJobsRequest,
    /// Close the stream after this long and reopen; `None` keeps it open.
    pub(crate) stream_timeout: Option<Duration>,
    pub(crate) backoff: Arc<dyn BackoffSupplier>,
    pub(crate) remaining: Arc<RemainingJobs>,
    pub(crate) queue: mpsc::Sender<Job>,
    pub(crate) cancel: CancellationToken,
}

enum StreamEnd {
    /// Server ended the stream, the stream timeout elapsed, or fresh
    /// credentials make an immediate reopen worthwhile.
    Reopen,
    /// The dispatcher is gone.
    QueueClosed,
}

impl JobStreamer {
    pub(crate) async fn run(self) {
        let mut delay = Duration::ZERO;
        loop {
            debug!(job_type = %self.request.job_type, "opening job stream");
            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                outcome = self.stream_once() => outcome,
            };
            match outcome {
                Ok(StreamEnd::Reopen) => {
                    debug!(job_type = %self.request.job_type, "job stream ended, reopening");
                    delay = Duration::ZERO;
                }
                Ok(StreamEnd::QueueClosed) => break,
                Err(e) => {
                    delay = self.backoff.supply_retry_delay(delay);
                    warn!(
                        job_type = %self.request.job_type,
                        error = %e,
                        class = %e.class(),
                        delay_ms = delay.as_millis() as u64,
                        "job stream failed, reopening after delay"
                    );
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
        info!(job_type = %self.request.job_type, "job streamer closed");
    }

    async fn stream_once(&self) -> Result<StreamEnd, RpcError> {
        let mut stream =
            self.client.stream_activated_jobs(self.request.clone(), self.stream_timeout).await?;
        let pump = async {
            while let Some(item) = stream.next().await {
                let job = match item {
                    Ok(job) => Job::from(job),
                    Err(e) if self.client.should_retry(&e).await => return Ok(StreamEnd::Reopen),
                    Err(e) => return Err(e),
                };
                self.remaining.acquire_one().await;
                if self.queue.send(job).await.is_err() {
                    self.remaining.release(1);
                    return Ok(StreamEnd::QueueClosed);
                }
            }
            Ok(StreamEnd::Reopen)
        };
        match self.stream_timeout {
            Some(limit) => tokio::time::timeout(limit, pump).await.unwrap_or(Ok(StreamEnd::Reopen)),
            None => pump.await,
        }
    }
}

#[cfg(test)]
#[path = "streamer_tests.rs"]
mod tests;
