// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording doubles shared by the unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use zb_auth::{CredentialsError, CredentialsProvider};
use zb_core::{BackoffSupplier, JobWorkerMetrics};
use zb_gateway::{Metadata, RpcCode, RpcError};

#[derive(Default)]
pub(crate) struct RecordingMetrics {
    pub(crate) reports: Mutex<Vec<usize>>,
}

impl RecordingMetrics {
    pub(crate) fn last(&self) -> Option<usize> {
        self.reports.lock().last().copied()
    }
}

impl JobWorkerMetrics for RecordingMetrics {
    fn set_jobs_remaining_count(&self, _job_type: &str, count: usize) {
        self.reports.lock().push(count);
    }
}

/// Returns a fixed delay and records every delay it was seeded with.
pub(crate) struct RecordingBackoff {
    pub(crate) delay: Duration,
    pub(crate) seeds: Mutex<Vec<Duration>>,
}

impl RecordingBackoff {
    pub(crate) fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self { delay, seeds: Mutex::new(Vec::new()) })
    }

    pub(crate) fn seeds(&self) -> Vec<Duration> {
        self.seeds.lock().clone()
    }
}

impl BackoffSupplier for RecordingBackoff {
    fn supply_retry_delay(&self, current: Duration) -> Duration {
        self.seeds.lock().push(current);
        self.delay
    }
}

/// Hands out `Bearer t<n>`; an unauthenticated error bumps `n` when
/// `rotate` is set.
#[derive(Default)]
pub(crate) struct FakeCredentials {
    pub(crate) generation: Mutex<u32>,
    pub(crate) rotate: bool,
    pub(crate) broken: bool,
    pub(crate) decisions: Mutex<Vec<bool>>,
}

#[async_trait]
impl CredentialsProvider for FakeCredentials {
    async fn apply_credentials(&self, headers: &mut Metadata) -> Result<(), CredentialsError> {
        if self.broken {
            return Err(CredentialsError::EmptyToken);
        }
        headers.insert("authorization", format!("Bearer t{}", *self.generation.lock()));
        Ok(())
    }

    async fn should_retry_request(&self, error: &RpcError) -> bool {
        let retry = self.rotate && error.code == RpcCode::Unauthenticated;
        if retry {
            *self.generation.lock() += 1;
        }
        self.decisions.lock().push(retry);
        retry
    }
}
