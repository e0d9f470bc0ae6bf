// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activated job: the unit of work leased by the gateway to a worker.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Gateway-assigned job key, unique and monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobKey(pub i64);

impl JobKey {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for JobKey {
    fn from(key: i64) -> Self {
        Self(key)
    }
}

/// Errors decoding the JSON payloads carried by a job
#[derive(Debug, Error)]
pub enum JobPayloadError {
    #[error("invalid variables document: {0}")]
    Variables(#[source] serde_json::Error),
    #[error("invalid custom headers document: {0}")]
    CustomHeaders(#[source] serde_json::Error),
}

/// A job leased to this worker.
///
/// The worker owns the job until it completes, fails, throws an error, or the
/// lease (`deadline`) expires and the gateway hands it to someone else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub key: JobKey,
    pub job_type: String,
    /// Remaining retries; decremented by the handler when it fails the job.
    pub retries: i32,
    /// When the lease expires.
    pub deadline: DateTime<Utc>,
    /// Name of the worker holding the lease.
    pub worker: String,
    /// JSON object with the headers defined in the process model.
    pub custom_headers: String,
    /// JSON object with the variables visible to the job's scope.
    pub variables: String,
    pub process_instance_key: i64,
    pub bpmn_process_id: String,
    pub process_definition_version: i32,
    pub process_definition_key: i64,
    pub element_id: String,
    pub element_instance_key: i64,
    #[serde(default)]
    pub tenant_id: String,
}

impl Job {
    /// Deserialize the variables document into `T`.
    pub fn variables_as<T: DeserializeOwned>(&self) -> Result<T, JobPayloadError> {
        serde_json::from_str(payload_or_empty(&self.variables)).map_err(JobPayloadError::Variables)
    }

    pub fn variables_map(&self) -> Result<serde_json::Map<String, serde_json::Value>, JobPayloadError> {
        self.variables_as()
    }

    /// Custom headers as string pairs. Non-string values are rendered as JSON.
    pub fn custom_headers_map(&self) -> Result<HashMap<String, String>, JobPayloadError> {
        let raw: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(payload_or_empty(&self.custom_headers))
                .map_err(JobPayloadError::CustomHeaders)?;
        Ok(raw
            .into_iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect())
    }

    /// Whether the lease has lapsed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline <= now
    }
}

// The gateway sends "" rather than "{}" for jobs without payloads.
fn payload_or_empty(raw: &str) -> &str {
    if raw.trim().is_empty() {
        "{}"
    } else {
        raw
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
