// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Count of jobs a worker holds: queued, running, or reserved by an
//! activation in flight. Never exceeds `max_jobs_active`.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;
use zb_core::JobWorkerMetrics;

pub(crate) struct RemainingJobs {
    max: usize,
    count: Mutex<usize>,
    released: Notify,
    contended: Notify,
    job_type: String,
    metrics: Arc<dyn JobWorkerMetrics>,
}

impl RemainingJobs {
    pub(crate) fn new(max: usize, job_type: String, metrics: Arc<dyn JobWorkerMetrics>) -> Self {
        Self {
            max,
            count: Mutex::new(0),
            released: Notify::new(),
            contended: Notify::new(),
            job_type,
            metrics,
        }
    }

    pub(crate) fn count(&self) -> usize {
        *self.count.lock()
    }

    /// Reserve up to `wanted` slots; returns how many were granted.
    pub(crate) fn reserve(&self, wanted: usize) -> usize {
        let mut count = self.count.lock();
        let granted = wanted.min(self.max.saturating_sub(*count));
        if granted > 0 {
            *count += granted;
            self.metrics.set_jobs_remaining_count(&self.job_type, *count);
        }
        granted
    }

    /// Wait until one slot is free and reserve it.
    ///
    /// While waiting, an activation holding reserved slots is asked to
    /// give back what it has not filled.
    pub(crate) async fn acquire_one(&self) {
        loop {
            let released = self.released.notified();
            if self.reserve(1) == 1 {
                return;
            }
            self.contended.notify_waiters();
            released.await;
        }
    }

    /// Resolves when a pushed job is waiting for a slot. Create it before
    /// reserving so no request is missed.
    pub(crate) fn contended(&self) -> Notified<'_> {
        self.contended.notified()
    }

    pub(crate) fn release(&self, n: usize) {
        if n == 0 {
            return;
        }
        {
            let mut count = self.count.lock();
            *count = count.saturating_sub(n);
            self.metrics.set_jobs_remaining_count(&self.job_type, *count);
        }
        self.released.notify_waiters();
    }
}

#[cfg(test)]
#[path = "remaining_tests.rs"]
mod tests;
