// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;

/// Handle to an open worker. Clones control the same worker.
#[derive(Clone)]
pub struct JobWorker {
    job_type: String,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl JobWorker {
    pub(crate) fn new(job_type: String, cancel: CancellationToken, tracker: TaskTracker) -> Self {
        Self { job_type, cancel, tracker }
    }

    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    /// Stop polling and streaming, then wait for running handlers.
    /// Safe to call more than once.
    pub async fn close(&self) {
        if !self.cancel.is_cancelled() {
            info!(job_type = %self.job_type, "closing job worker");
            self.cancel.cancel();
        }
        self.tracker.wait().await;
    }

    /// Wait for the worker to finish without asking it to stop.
    pub async fn await_close(&self) {
        self.tracker.wait().await;
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() && self.tracker.is_empty()
    }
}

impl std::fmt::Debug for JobWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobWorker")
            .field("job_type", &self.job_type)
            .field("closing", &self.cancel.is_cancelled())
            .field("tasks", &self.tracker.len())
            .finish()
    }
}
