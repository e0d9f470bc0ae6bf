// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential-aware gateway calls.
//!
//! Every call gets freshly applied credentials. A failed call is repeated
//! for as long as the credentials provider says a retry may succeed.

use futures_util::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use zb_auth::{CredentialsProvider, NoopCredentialsProvider};
use zb_core::Job;
use zb_gateway::{
    ActivateJobsRequest, ActivateJobsResponse, ActivatedJob, CallOptions, CompleteJobRequest,
    FailJobRequest, Gateway, Metadata, ResponseStream, RpcError, StreamActivatedJobsRequest,
    ThrowErrorRequest, TopologyResponse, UpdateJobRetriesRequest, UpdateJobTimeoutRequest,
};

/// Deadline for unary calls unless overridden.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Cheap to clone; handlers receive their own copy.
#[derive(Clone)]
pub struct JobClient {
    gateway: Arc<dyn Gateway>,
    credentials: Arc<dyn CredentialsProvider>,
    request_timeout: Duration,
}

impl JobClient {
    /// A client without credentials.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            credentials: Arc::new(NoopCredentialsProvider),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Whether a failed call (or stream) should be repeated.
    pub async fn should_retry(&self, error: &RpcError) -> bool {
        let retry = self.credentials.should_retry_request(error).await;
        debug!(code = %error.code, retry, "checked failed call for retry");
        retry
    }

    async fn call_options(&self, timeout: Option<Duration>) -> Result<CallOptions, RpcError> {
        let mut metadata = Metadata::new();
        self.credentials
            .apply_credentials(&mut metadata)
            .await
            .map_err(|e| RpcError::cancelled(format!("failed to apply credentials: {e}")))?;
        Ok(CallOptions::new(metadata, timeout))
    }

    async fn invoke<T, F, Fut>(&self, timeout: Option<Duration>, call: F) -> Result<T, RpcError>
    where
        F: Fn(Arc<dyn Gateway>, CallOptions) -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        loop {
            let options = self.call_options(timeout).await?;
            let pending = call(Arc::clone(&self.gateway), options);
            let result = match timeout {
                Some(limit) => match tokio::time::timeout(limit, pending).await {
                    Ok(result) => result,
                    Err(_) => Err(RpcError::deadline_exceeded(format!(
                        "no response within {}ms",
                        limit.as_millis()
                    ))),
                },
                None => pending.await,
            };
            match result {
                Ok(value) => return Ok(value),
                Err(e) if self.should_retry(&e).await => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Open an activation stream. `timeout` bounds opening the call; the
    /// caller bounds consumption of the stream.
    pub async fn open_activate_jobs(
        &self,
        request: ActivateJobsRequest,
        timeout: Duration,
    ) -> Result<ResponseStream<ActivateJobsResponse>, RpcError> {
        self.invoke(Some(timeout), |gateway, options| {
            let request = request.clone();
            async move { gateway.activate_jobs(options, request).await }
        })
        .await
    }

    /// Activate jobs and collect every batch.
    ///
    /// A failure after jobs were received returns the error; the jobs
    /// already activated time out on the broker.
    pub async fn activate_jobs(&self, request: ActivateJobsRequest) -> Result<Vec<Job>, RpcError> {
        let timeout = self.request_timeout;
        let collect = async {
            loop {
                let mut stream = match self.open_activate_jobs(request.clone(), timeout).await {
                    Ok(stream) => stream,
                    Err(e) => return Err(e),
                };
                let mut jobs = Vec::new();
                let mut failure = None;
                while let Some(item) = stream.next().await {
                    match item {
                        Ok(response) => jobs.extend(response.jobs.into_iter().map(Job::from)),
                        Err(e) => {
                            failure = Some(e);
                            break;
                        }
                    }
                }
                match failure {
                    None => return Ok(jobs),
                    Some(e) if jobs.is_empty() && self.should_retry(&e).await => continue,
                    Some(e) => return Err(e),
                }
            }
        };
        match tokio::time::timeout(timeout, collect).await {
            Ok(result) => result,
            Err(_) => Err(RpcError::deadline_exceeded("activation did not finish in time")),
        }
    }

    /// Open a job push stream. `None` lets the stream run until the
    /// gateway ends it.
    pub async fn stream_activated_jobs(
        &self,
        request: StreamActivatedJobsRequest,
        timeout: Option<Duration>,
    ) -> Result<ResponseStream<ActivatedJob>, RpcError> {
        self.invoke(Some(self.request_timeout), |gateway, options| {
            let request = request.clone();
            let options = CallOptions { timeout, ..options };
            async move { gateway.stream_activated_jobs(options, request).await }
        })
        .await
    }

    pub async fn complete_job(&self, request: CompleteJobRequest) -> Result<(), RpcError> {
        self.invoke(Some(self.request_timeout), |gateway, options| {
            let request = request.clone();
            async move { gateway.complete_job(options, request).await }
        })
        .await
    }

    pub async fn fail_job(&self, request: FailJobRequest) -> Result<(), RpcError> {
        self.invoke(Some(self.request_timeout), |gateway, options| {
            let request = request.clone();
            async move { gateway.fail_job(options, request).await }
        })
        .await
    }

    pub async fn throw_error(&self, request: ThrowErrorRequest) -> Result<(), RpcError> {
        self.invoke(Some(self.request_timeout), |gateway, options| {
            let request = request.clone();
            async move { gateway.throw_error(options, request).await }
        })
        .await
    }

    pub async fn update_job_retries(&self, request: UpdateJobRetriesRequest) -> Result<(), RpcError> {
        self.invoke(Some(self.request_timeout), |gateway, options| {
            let request = request.clone();
            async move { gateway.update_job_retries(options, request).await }
        })
        .await
    }

    pub async fn update_job_timeout(&self, request: UpdateJobTimeoutRequest) -> Result<(), RpcError> {
        self.invoke(Some(self.request_timeout), |gateway, options| {
            let request = request.clone();
            async move { gateway.update_job_timeout(options, request).await }
        })
        .await
    }

    pub async fn topology(&self) -> Result<TopologyResponse, RpcError> {
        self.invoke(Some(self.request_timeout), |gateway, options| async move {
            gateway.topology(options).await
        })
        .await
    }

    /// Version reported by the gateway, read from the topology.
    pub async fn gateway_version(&self) -> Result<String, RpcError> {
        Ok(self.topology().await?.gateway_version)
    }
}

impl std::fmt::Debug for JobClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobClient")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
