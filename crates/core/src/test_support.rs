// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::job::{Job, JobKey};
use chrono::{DateTime, Utc};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for backoff and deadline parameters.
pub mod strategies {
    use proptest::prelude::*;
    use std::time::Duration;

    /// Per-call deadlines from 1ms up to ten minutes.
    pub fn arb_deadline() -> impl Strategy<Value = Duration> {
        (1u64..600_000).prop_map(Duration::from_millis)
    }

    /// `(min, max, factor)` triples with `min <= max` and `factor >= 1`.
    pub fn arb_backoff_bounds() -> impl Strategy<Value = (Duration, Duration, f64)> {
        (1u64..5_000, 0u64..60_000, 1.0f64..4.0).prop_map(|(min, extra, factor)| {
            (Duration::from_millis(min), Duration::from_millis(min + extra), factor)
        })
    }
}

// ── Job factory functions ───────────────────────────────────────────────

/// A job with plausible defaults and an empty payload.
pub fn job(key: i64, job_type: &str) -> Job {
    Job {
        key: JobKey(key),
        job_type: job_type.to_string(),
        retries: 3,
        deadline: DateTime::<Utc>::from_timestamp(1_700_000_300, 0).unwrap_or_default(),
        worker: "test-worker".to_string(),
        custom_headers: "{}".to_string(),
        variables: "{}".to_string(),
        process_instance_key: 2_251_799_813_685_250,
        bpmn_process_id: "order-process".to_string(),
        process_definition_version: 1,
        process_definition_key: 2_251_799_813_685_249,
        element_id: "task".to_string(),
        element_instance_key: key + 1,
        tenant_id: "<default>".to_string(),
    }
}

/// `count` jobs with consecutive keys starting at `first_key`.
pub fn jobs(first_key: i64, count: usize, job_type: &str) -> Vec<Job> {
    (0..count as i64).map(|i| job(first_key + i, job_type)).collect()
}
