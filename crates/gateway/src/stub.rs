// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The gateway RPC stub consumed by the worker runtime.
//!
//! The transport (channel setup, TLS, keep-alive) lives behind this trait;
//! the runtime only places calls and classifies their failures.

use crate::error::RpcError;
use crate::messages::{
    ActivateJobsRequest, ActivateJobsResponse, ActivatedJob, CompleteJobRequest, FailJobRequest,
    StreamActivatedJobsRequest, ThrowErrorRequest, TopologyResponse, UpdateJobRetriesRequest,
    UpdateJobTimeoutRequest,
};
use crate::metadata::Metadata;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::time::Duration;

/// Server-streaming response. The stream ending (`None`) is the normal
/// end-of-stream; an `Err` item is terminal.
pub type ResponseStream<T> = BoxStream<'static, Result<T, RpcError>>;

/// Options for a single call.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub metadata: Metadata,
    /// Client-side deadline; `None` for calls that may run indefinitely.
    pub timeout: Option<Duration>,
}

impl CallOptions {
    pub fn new(metadata: Metadata, timeout: Option<Duration>) -> Self {
        Self { metadata, timeout }
    }
}

/// Gateway job API.
#[async_trait]
pub trait Gateway: Send + Sync + 'static {
    async fn activate_jobs(
        &self,
        options: CallOptions,
        request: ActivateJobsRequest,
    ) -> Result<ResponseStream<ActivateJobsResponse>, RpcError>;

    async fn stream_activated_jobs(
        &self,
        options: CallOptions,
        request: StreamActivatedJobsRequest,
    ) -> Result<ResponseStream<ActivatedJob>, RpcError>;

    async fn complete_job(
        &self,
        options: CallOptions,
        request: CompleteJobRequest,
    ) -> Result<(), RpcError>;

    async fn fail_job(&self, options: CallOptions, request: FailJobRequest)
        -> Result<(), RpcError>;

    async fn throw_error(
        &self,
        options: CallOptions,
        request: ThrowErrorRequest,
    ) -> Result<(), RpcError>;

    async fn update_job_retries(
        &self,
        options: CallOptions,
        request: UpdateJobRetriesRequest,
    ) -> Result<(), RpcError>;

    async fn update_job_timeout(
        &self,
        options: CallOptions,
        request: UpdateJobTimeoutRequest,
    ) -> Result<(), RpcError>;

    /// Cluster topology, including the gateway version.
    async fn topology(&self, options: CallOptions) -> Result<TopologyResponse, RpcError>;
}
