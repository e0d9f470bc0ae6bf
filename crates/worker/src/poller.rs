// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keeps the job queue topped up through `ActivateJobs`.
//!
//! The loop wakes on a finished handler, the poll timer, or close. After
//! each wake-up it activates jobs if the remaining count dropped to the
//! threshold, requesting exactly the free capacity. A job pushed by the
//! streamer while an activation holds the free capacity ends that
//! activation early, so the stream is never starved by a long poll.

use crate::client::JobClient;
use crate::remaining::RemainingJobs;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::futures::Notified;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use zb_core::{BackoffSupplier, Job, JobWorkerMetrics};
use zb_gateway::{ActivateJobsRequest, RpcError};

pub(crate) struct JobPoller {
    pub(crate) client: JobClient,
    /// Everything but `max_jobs_to_activate`, which is set per activation.
    pub(crate) request: ActivateJobsRequest,
    pub(crate) request_timeout: Duration,
    pub(crate) max_jobs_active: usize,
    pub(crate) threshold: usize,
    pub(crate) poll_interval: Duration,
    pub(crate) backoff: Arc<dyn BackoffSupplier>,
    pub(crate) remaining: Arc<RemainingJobs>,
    pub(crate) metrics: Arc<dyn JobWorkerMetrics>,
    pub(crate) queue: mpsc::Sender<Job>,
    pub(crate) finished: mpsc::Receiver<()>,
    pub(crate) cancel: CancellationToken,
}

/// Sticky back-off after a failed activation.
#[derive(Debug, Clone, Copy)]
struct Pause {
    delay: Duration,
    until: Instant,
}

struct Activation {
    delivered: usize,
    error: Option<RpcError>,
}

impl JobPoller {
    pub(crate) async fn run(mut self) {
        let mut pause = None;
        self.poll(&mut pause).await;

        loop {
            let wait = pause.map_or(self.poll_interval, |p: Pause| p.delay);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                Some(()) = self.finished.recv() => {
                    let mut done = 1;
                    while self.finished.try_recv().is_ok() {
                        done += 1;
                    }
                    self.remaining.release(done);
                }
                _ = tokio::time::sleep(wait) => {}
            }
            self.poll(&mut pause).await;
        }

        self.metrics.set_jobs_remaining_count(&self.request.job_type, 0);
        info!(job_type = %self.request.job_type, "poller closed");
    }

    async fn poll(&self, pause: &mut Option<Pause>) {
        if self.cancel.is_cancelled() || self.remaining.count() > self.threshold {
            return;
        }
        if pause.is_some_and(|p| Instant::now() < p.until) {
            return;
        }
        let contended = self.remaining.contended();
        let wanted = self.remaining.reserve(self.max_jobs_active);
        if wanted == 0 {
            return;
        }

        let outcome = self.activate(wanted, contended).await;
        self.remaining.release(wanted.saturating_sub(outcome.delivered));
        if self.cancel.is_cancelled() {
            return;
        }

        match outcome.error {
            None => {
                debug!(
                    job_type = %self.request.job_type,
                    requested = wanted,
                    delivered = outcome.delivered,
                    "activated jobs"
                );
                if pause.take().is_some() {
                    debug!(job_type = %self.request.job_type, "activation recovered, back-off reset");
                }
            }
            Some(e) => {
                let previous = pause.map_or(self.poll_interval, |p| p.delay);
                let delay = self.backoff.supply_retry_delay(previous);
                *pause = Some(Pause { delay, until: Instant::now() + delay });
                warn!(
                    job_type = %self.request.job_type,
                    error = %e,
                    class = %e.class(),
                    delivered = outcome.delivered,
                    "failed to activate jobs"
                );
                debug!(
                    job_type = %self.request.job_type,
                    delay_ms = delay.as_millis() as u64,
                    "back-off applied"
                );
            }
        }
    }

    /// Activate up to `wanted` jobs. Ends early, keeping what was delivered,
    /// on close or when a pushed job needs one of the reserved slots.
    async fn activate(&self, wanted: usize, contended: Notified<'_>) -> Activation {
        let mut delivered = 0usize;
        let run = async {
            loop {
                let mut request = self.request.clone();
                request.max_jobs_to_activate =
                    i32::try_from(wanted.saturating_sub(delivered)).unwrap_or(i32::MAX);
                let mut stream =
                    match self.client.open_activate_jobs(request, self.request_timeout).await {
                        Ok(stream) => stream,
                        Err(e) => return Err(e),
                    };

                let mut failure = None;
                while let Some(item) = stream.next().await {
                    let response = match item {
                        Ok(response) => response,
                        Err(e) => {
                            failure = Some(e);
                            break;
                        }
                    };
                    for job in response.jobs {
                        if self.queue.send(Job::from(job)).await.is_err() {
                            // dispatcher is gone
                            return Ok(());
                        }
                        delivered += 1;
                    }
                }

                match failure {
                    None => return Ok(()),
                    Some(e) if delivered < wanted && self.client.should_retry(&e).await => continue,
                    Some(e) => return Err(e),
                }
            }
        };

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Ok(()),
            _ = contended => {
                debug!(job_type = %self.request.job_type, "job stream needs capacity, ending activation");
                Ok(())
            }
            result = tokio::time::timeout(self.request_timeout, run) => match result {
                Ok(result) => result,
                Err(_) => Err(RpcError::deadline_exceeded("activation did not finish in time")),
            },
        };
        Activation { delivered, error: result.err() }
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
