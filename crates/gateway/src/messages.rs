// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request and response messages of the gateway job API.
//!
//! Field names follow the gateway protocol (camelCase on the wire). Durations
//! are milliseconds and timestamps are milliseconds since the Unix epoch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zb_core::{Job, JobKey};

/// Poll for up to `max_jobs_to_activate` jobs of one type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateJobsRequest {
    #[serde(rename = "type")]
    pub job_type: String,
    pub worker: String,
    /// Lease duration in milliseconds
    pub timeout: i64,
    pub max_jobs_to_activate: i32,
    /// Restrict the variables fetched with each job; empty fetches all.
    pub fetch_variable: Vec<String>,
    /// Long-poll timeout in milliseconds; `-1` disables long polling
    pub request_timeout: i64,
    pub tenant_ids: Vec<String>,
}

/// One batch of activated jobs. A single activation may yield several.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateJobsResponse {
    pub jobs: Vec<ActivatedJob>,
}

/// Open a long-lived stream that pushes jobs as they become activatable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamActivatedJobsRequest {
    #[serde(rename = "type")]
    pub job_type: String,
    pub worker: String,
    /// Lease duration in milliseconds
    pub timeout: i64,
    pub fetch_variable: Vec<String>,
    pub tenant_ids: Vec<String>,
}

/// A job as sent by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivatedJob {
    pub key: i64,
    #[serde(rename = "type")]
    pub job_type: String,
    pub process_instance_key: i64,
    pub bpmn_process_id: String,
    pub process_definition_version: i32,
    pub process_definition_key: i64,
    pub element_id: String,
    pub element_instance_key: i64,
    pub custom_headers: String,
    pub worker: String,
    pub retries: i32,
    /// Lease expiry in epoch milliseconds
    pub deadline: i64,
    pub variables: String,
    #[serde(default)]
    pub tenant_id: String,
}

impl From<ActivatedJob> for Job {
    fn from(job: ActivatedJob) -> Self {
        Job {
            key: JobKey(job.key),
            job_type: job.job_type,
            retries: job.retries,
            deadline: DateTime::<Utc>::from_timestamp_millis(job.deadline).unwrap_or_default(),
            worker: job.worker,
            custom_headers: job.custom_headers,
            variables: job.variables,
            process_instance_key: job.process_instance_key,
            bpmn_process_id: job.bpmn_process_id,
            process_definition_version: job.process_definition_version,
            process_definition_key: job.process_definition_key,
            element_id: job.element_id,
            element_instance_key: job.element_instance_key,
            tenant_id: job.tenant_id,
        }
    }
}

impl From<&Job> for ActivatedJob {
    fn from(job: &Job) -> Self {
        ActivatedJob {
            key: job.key.get(),
            job_type: job.job_type.clone(),
            process_instance_key: job.process_instance_key,
            bpmn_process_id: job.bpmn_process_id.clone(),
            process_definition_version: job.process_definition_version,
            process_definition_key: job.process_definition_key,
            element_id: job.element_id.clone(),
            element_instance_key: job.element_instance_key,
            custom_headers: job.custom_headers.clone(),
            worker: job.worker.clone(),
            retries: job.retries,
            deadline: job.deadline.timestamp_millis(),
            variables: job.variables.clone(),
            tenant_id: job.tenant_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteJobRequest {
    pub job_key: i64,
    /// JSON object merged into the process scope; empty for none
    pub variables: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailJobRequest {
    pub job_key: i64,
    /// Retries left after this failure; 0 raises an incident
    pub retries: i32,
    pub error_message: String,
    /// Delay before the job becomes activatable again, in milliseconds
    pub retry_back_off: i64,
    pub variables: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrowErrorRequest {
    pub job_key: i64,
    pub error_code: String,
    pub error_message: String,
    pub variables: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRetriesRequest {
    pub job_key: i64,
    pub retries: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobTimeoutRequest {
    pub job_key: i64,
    /// New lease duration in milliseconds, counted from now
    pub timeout: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartitionRole {
    Leader,
    #[default]
    Follower,
    Inactive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartitionHealth {
    #[default]
    Healthy,
    Unhealthy,
    Dead,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub partition_id: i32,
    pub role: PartitionRole,
    pub health: PartitionHealth,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerInfo {
    pub node_id: i32,
    pub host: String,
    pub port: i32,
    pub partitions: Vec<Partition>,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyResponse {
    pub brokers: Vec<BrokerInfo>,
    pub cluster_size: i32,
    pub partitions_count: i32,
    pub replication_factor: i32,
    pub gateway_version: String,
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
