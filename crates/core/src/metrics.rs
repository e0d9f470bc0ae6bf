// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metrics sink reported to by job workers.

/// Receives worker gauges. Implementations must be cheap and non-blocking;
/// they are called from the poller loop.
pub trait JobWorkerMetrics: Send + Sync {
    /// Jobs currently owned by the worker (queued plus being handled).
    fn set_jobs_remaining_count(&self, job_type: &str, count: usize);
}

/// Metrics sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetrics;

impl JobWorkerMetrics for NoopMetrics {
    fn set_jobs_remaining_count(&self, _job_type: &str, _count: usize) {}
}
