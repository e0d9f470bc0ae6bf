// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typestate builder for [`JobWorker`].
//!
//! `open()` only exists once both a job type and a handler were given.
//! Everything else has a default; invalid values are logged and ignored.

use crate::client::{JobClient, DEFAULT_REQUEST_TIMEOUT};
use crate::dispatcher::JobDispatcher;
use crate::handler::JobHandler;
use crate::poller::JobPoller;
use crate::remaining::RemainingJobs;
use crate::streamer::JobStreamer;
use crate::worker::JobWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};
use zb_core::{
    long_poll_millis, BackoffSupplier, ExponentialBackoff, JobWorkerMetrics, NoopMetrics,
};
use zb_gateway::{ActivateJobsRequest, StreamActivatedJobsRequest};

pub const DEFAULT_MAX_JOBS_ACTIVE: usize = 32;
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_POLL_THRESHOLD: f64 = 0.3;
/// How long an activated job is reserved for this worker.
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_WORKER_NAME: &str = "default";

/// Job type not yet set.
pub struct NoJobType;
pub struct HasJobType(String);
/// Handler not yet set.
pub struct NoHandler;
pub struct HasHandler(Arc<dyn JobHandler>);

#[derive(Clone)]
struct WorkerSettings {
    name: String,
    max_jobs_active: usize,
    concurrency: usize,
    poll_interval: Duration,
    poll_threshold: f64,
    timeout: Duration,
    request_timeout: Duration,
    fetch_variables: Vec<String>,
    tenant_ids: Vec<String>,
    metrics: Arc<dyn JobWorkerMetrics>,
    backoff: Arc<dyn BackoffSupplier>,
    stream_enabled: bool,
    stream_timeout: Option<Duration>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_WORKER_NAME.to_string(),
            max_jobs_active: DEFAULT_MAX_JOBS_ACTIVE,
            concurrency: DEFAULT_CONCURRENCY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_threshold: DEFAULT_POLL_THRESHOLD,
            timeout: DEFAULT_JOB_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            fetch_variables: Vec::new(),
            tenant_ids: Vec::new(),
            metrics: Arc::new(NoopMetrics),
            backoff: Arc::new(ExponentialBackoff::default()),
            stream_enabled: false,
            stream_timeout: None,
        }
    }
}

pub struct JobWorkerBuilder<T = NoJobType, H = NoHandler> {
    client: JobClient,
    job_type: T,
    handler: H,
    settings: WorkerSettings,
}

impl JobWorkerBuilder {
    pub fn new(client: JobClient) -> Self {
        Self { client, job_type: NoJobType, handler: NoHandler, settings: WorkerSettings::default() }
    }
}

impl<H> JobWorkerBuilder<NoJobType, H> {
    pub fn job_type(self, job_type: impl Into<String>) -> JobWorkerBuilder<HasJobType, H> {
        JobWorkerBuilder {
            client: self.client,
            job_type: HasJobType(job_type.into()),
            handler: self.handler,
            settings: self.settings,
        }
    }
}

impl<T> JobWorkerBuilder<T, NoHandler> {
    pub fn handler(self, handler: impl JobHandler) -> JobWorkerBuilder<T, HasHandler> {
        JobWorkerBuilder {
            client: self.client,
            job_type: self.job_type,
            handler: HasHandler(Arc::new(handler)),
            settings: self.settings,
        }
    }
}

impl<T, H> JobWorkerBuilder<T, H> {
    /// Worker name sent with activations.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.settings.name = name.into();
        self
    }

    /// Upper bound on jobs held at once (queued plus running).
    pub fn max_jobs_active(mut self, n: usize) -> Self {
        if n == 0 {
            warn!(value = n, "ignoring invalid max_jobs_active, must be greater than zero");
        } else {
            self.settings.max_jobs_active = n;
        }
        self
    }

    /// Handlers running in parallel.
    pub fn concurrency(mut self, n: usize) -> Self {
        if n == 0 {
            warn!(value = n, "ignoring invalid concurrency, must be greater than zero");
        } else {
            self.settings.concurrency = n;
        }
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        if interval.is_zero() {
            warn!("ignoring zero poll_interval");
        } else {
            self.settings.poll_interval = interval;
        }
        self
    }

    /// Fraction of `max_jobs_active` the remaining count must drop to
    /// before the next activation.
    pub fn poll_threshold(mut self, threshold: f64) -> Self {
        if threshold.is_nan() || threshold <= 0.0 {
            warn!(value = threshold, "ignoring invalid poll_threshold, must be greater than zero");
        } else {
            self.settings.poll_threshold = threshold;
        }
        self
    }

    /// How long activated jobs stay reserved for this worker.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Client deadline of each activation; the long-poll timeout is derived from it.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.settings.request_timeout = timeout;
        self
    }

    pub fn fetch_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.fetch_variables = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn tenant_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.tenant_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn JobWorkerMetrics>) -> Self {
        self.settings.metrics = metrics;
        self
    }

    /// Delay policy for failed activations and job stream reopens.
    pub fn backoff(mut self, backoff: Arc<dyn BackoffSupplier>) -> Self {
        self.settings.backoff = backoff;
        self
    }

    pub fn stream_enabled(mut self, enabled: bool) -> Self {
        self.settings.stream_enabled = enabled;
        self
    }

    /// Reopen the job stream after this long.
    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.settings.stream_timeout = Some(timeout);
        self
    }
}

impl JobWorkerBuilder<HasJobType, HasHandler> {
    /// Start the dispatcher, poller and (if enabled) streamer.
    ///
    /// Must be called within a tokio runtime.
    pub fn open(self) -> JobWorker {
        let HasJobType(job_type) = self.job_type;
        let HasHandler(handler) = self.handler;
        let s = self.settings;
        let capacity = s.max_jobs_active;

        let (queue_tx, queue_rx) = mpsc::channel(capacity);
        let (finished_tx, finished_rx) = mpsc::channel(capacity);
        let remaining = Arc::new(RemainingJobs::new(capacity, job_type.clone(), s.metrics.clone()));
        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();

        let dispatcher = JobDispatcher {
            job_type: job_type.clone(),
            concurrency: s.concurrency,
            handler,
            client: self.client.clone(),
            queue: queue_rx,
            finished: finished_tx,
            cancel: cancel.child_token(),
        };
        let poller = JobPoller {
            client: self.client.clone(),
            request: ActivateJobsRequest {
                job_type: job_type.clone(),
                worker: s.name.clone(),
                timeout: millis(s.timeout),
                max_jobs_to_activate: 0,
                fetch_variable: s.fetch_variables.clone(),
                request_timeout: long_poll_millis(Some(s.request_timeout)),
                tenant_ids: s.tenant_ids.clone(),
            },
            request_timeout: s.request_timeout,
            max_jobs_active: capacity,
            threshold: poll_threshold_count(capacity, s.poll_threshold),
            poll_interval: s.poll_interval,
            backoff: s.backoff.clone(),
            remaining: remaining.clone(),
            metrics: s.metrics.clone(),
            queue: queue_tx.clone(),
            finished: finished_rx,
            cancel: cancel.child_token(),
        };

        tracker.spawn(dispatcher.run());
        tracker.spawn(poller.run());
        if s.stream_enabled {
            let streamer = JobStreamer {
                client: self.client,
                request: StreamActivatedJobsRequest {
                    job_type: job_type.clone(),
                    worker: s.name.clone(),
                    timeout: millis(s.timeout),
                    fetch_variable: s.fetch_variables,
                    tenant_ids: s.tenant_ids,
                },
                stream_timeout: s.stream_timeout,
                backoff: s.backoff,
                remaining,
                queue: queue_tx,
                cancel: cancel.child_token(),
            };
            tracker.spawn(streamer.run());
        }
        tracker.close();

        info!(
            job_type = %job_type,
            worker = %s.name,
            max_jobs_active = capacity,
            concurrency = s.concurrency,
            stream_enabled = s.stream_enabled,
            "job worker opened"
        );
        JobWorker::new(job_type, cancel, tracker)
    }
}

fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Remaining count at or below which the poller activates more jobs.
pub(crate) fn poll_threshold_count(max_jobs_active: usize, poll_threshold: f64) -> usize {
    let threshold = (max_jobs_active as f64 * poll_threshold).floor();
    if threshold <= 0.0 {
        0
    } else {
        (threshold as usize).min(max_jobs_active)
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
