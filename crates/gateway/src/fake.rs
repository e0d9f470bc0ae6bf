// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted in-memory gateway for tests.

use crate::error::RpcError;
use crate::messages::{
    ActivateJobsRequest, ActivateJobsResponse, ActivatedJob, CompleteJobRequest, FailJobRequest,
    StreamActivatedJobsRequest, ThrowErrorRequest, TopologyResponse, UpdateJobRetriesRequest,
    UpdateJobTimeoutRequest,
};
use crate::metadata::Metadata;
use crate::stub::{CallOptions, Gateway, ResponseStream};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Gateway methods, for scripting failures and filtering recorded calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    ActivateJobs,
    StreamActivatedJobs,
    CompleteJob,
    FailJob,
    ThrowError,
    UpdateJobRetries,
    UpdateJobTimeout,
    Topology,
}

zb_core::simple_display! {
    Method {
        ActivateJobs => "ActivateJobs",
        StreamActivatedJobs => "StreamActivatedJobs",
        CompleteJob => "CompleteJob",
        FailJob => "FailJob",
        ThrowError => "ThrowError",
        UpdateJobRetries => "UpdateJobRetries",
        UpdateJobTimeout => "UpdateJobTimeout",
        Topology => "Topology",
    }
}

/// Request payload of a recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    ActivateJobs(ActivateJobsRequest),
    StreamActivatedJobs(StreamActivatedJobsRequest),
    CompleteJob(CompleteJobRequest),
    FailJob(FailJobRequest),
    ThrowError(ThrowErrorRequest),
    UpdateJobRetries(UpdateJobRetriesRequest),
    UpdateJobTimeout(UpdateJobTimeoutRequest),
    Topology,
}

/// A call received by the fake, in arrival order.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub metadata: Metadata,
    pub timeout: Option<Duration>,
    pub request: RecordedRequest,
}

/// How a scripted job stream ends after delivering its jobs.
#[derive(Debug, Clone)]
pub enum StreamEnd {
    /// Clean end-of-stream
    Close,
    /// Terminal error after the jobs
    Error(RpcError),
    /// Stay open until the client drops the stream
    Hold,
}

/// Outcome of one `StreamActivatedJobs` call.
#[derive(Debug, Clone)]
pub enum StreamScript {
    /// The call itself fails
    Fail(RpcError),
    Jobs { jobs: Vec<ActivatedJob>, end: StreamEnd },
}

#[derive(Default)]
struct FakeGatewayState {
    calls: Vec<RecordedCall>,
    activatable: VecDeque<ActivatedJob>,
    failures: HashMap<Method, VecDeque<RpcError>>,
    streams: VecDeque<StreamScript>,
    interrupts: VecDeque<RpcError>,
    long_poll: bool,
    topology: TopologyResponse,
}

/// Fake gateway.
///
/// `ActivateJobs` hands out up to `maxJobsToActivate` jobs from a pool and
/// ends the stream; with an empty pool it answers with no jobs, or holds
/// the call open when long polling is on. Queued failures are returned
/// before anything else, per method.
/// `StreamActivatedJobs` plays queued [`StreamScript`]s and holds the stream
/// open once the scripts run out.
#[derive(Clone, Default)]
pub struct FakeGateway {
    inner: Arc<Mutex<FakeGatewayState>>,
    recorded: Arc<Notify>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add jobs to the activation pool.
    pub fn push_jobs(&self, jobs: impl IntoIterator<Item = ActivatedJob>) {
        self.inner.lock().activatable.extend(jobs);
    }

    /// Jobs still waiting in the activation pool.
    pub fn pending_jobs(&self) -> usize {
        self.inner.lock().activatable.len()
    }

    /// Fail the next call to `method` with `error`.
    pub fn fail_next(&self, method: Method, error: RpcError) {
        self.inner.lock().failures.entry(method).or_default().push_back(error);
    }

    /// End the next successful `ActivateJobs` stream with `error` after its
    /// batch.
    pub fn interrupt_next_activation(&self, error: RpcError) {
        self.inner.lock().interrupts.push_back(error);
    }

    /// Hold `ActivateJobs` calls that find the pool empty until the caller
    /// gives up, like a long-polling gateway.
    pub fn long_poll(&self, enabled: bool) {
        self.inner.lock().long_poll = enabled;
    }

    pub fn push_stream(&self, script: StreamScript) {
        self.inner.lock().streams.push_back(script);
    }

    pub fn set_topology(&self, topology: TopologyResponse) {
        self.inner.lock().topology = topology;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().calls.clone()
    }

    pub fn calls_to(&self, method: Method) -> Vec<RecordedCall> {
        self.inner.lock().calls.iter().filter(|c| c.method == method).cloned().collect()
    }

    /// Every `ActivateJobs` request received so far.
    pub fn activate_requests(&self) -> Vec<ActivateJobsRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c.request {
                RecordedRequest::ActivateJobs(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    /// Wait until at least `count` calls to `method` were recorded.
    pub async fn wait_for_calls(&self, method: Method, count: usize) {
        loop {
            let notified = self.recorded.notified();
            if self.calls_to(method).len() >= count {
                return;
            }
            notified.await;
        }
    }

    fn record(
        &self,
        method: Method,
        options: &CallOptions,
        request: RecordedRequest,
    ) -> Result<(), RpcError> {
        let failure = {
            let mut state = self.inner.lock();
            state.calls.push(RecordedCall {
                method,
                metadata: options.metadata.clone(),
                timeout: options.timeout,
                request,
            });
            state.failures.get_mut(&method).and_then(VecDeque::pop_front)
        };
        self.recorded.notify_waiters();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn activate_jobs(
        &self,
        options: CallOptions,
        request: ActivateJobsRequest,
    ) -> Result<ResponseStream<ActivateJobsResponse>, RpcError> {
        self.record(Method::ActivateJobs, &options, RecordedRequest::ActivateJobs(request.clone()))?;
        let (jobs, interrupt, long_poll) = {
            let mut state = self.inner.lock();
            let take = usize::try_from(request.max_jobs_to_activate)
                .unwrap_or(0)
                .min(state.activatable.len());
            let jobs = state
                .activatable
                .drain(..take)
                .map(|mut job| {
                    job.worker = request.worker.clone();
                    job
                })
                .collect::<Vec<ActivatedJob>>();
            (jobs, state.interrupts.pop_front(), state.long_poll)
        };
        if jobs.is_empty() && interrupt.is_none() && long_poll {
            return Ok(stream::pending().boxed());
        }
        let mut responses =
            if jobs.is_empty() { Vec::new() } else { vec![Ok(ActivateJobsResponse { jobs })] };
        responses.extend(interrupt.map(Err));
        Ok(stream::iter(responses).boxed())
    }

    async fn stream_activated_jobs(
        &self,
        options: CallOptions,
        request: StreamActivatedJobsRequest,
    ) -> Result<ResponseStream<ActivatedJob>, RpcError> {
        self.record(
            Method::StreamActivatedJobs,
            &options,
            RecordedRequest::StreamActivatedJobs(request),
        )?;
        let script = self.inner.lock().streams.pop_front();
        match script {
            None => Ok(stream::pending().boxed()),
            Some(StreamScript::Fail(err)) => Err(err),
            Some(StreamScript::Jobs { jobs, end }) => {
                let jobs = stream::iter(jobs.into_iter().map(Ok));
                Ok(match end {
                    StreamEnd::Close => jobs.boxed(),
                    StreamEnd::Error(err) => jobs.chain(stream::iter([Err(err)])).boxed(),
                    StreamEnd::Hold => jobs.chain(stream::pending()).boxed(),
                })
            }
        }
    }

    async fn complete_job(
        &self,
        options: CallOptions,
        request: CompleteJobRequest,
    ) -> Result<(), RpcError> {
        self.record(Method::CompleteJob, &options, RecordedRequest::CompleteJob(request))
    }

    async fn fail_job(
        &self,
        options: CallOptions,
        request: FailJobRequest,
    ) -> Result<(), RpcError> {
        self.record(Method::FailJob, &options, RecordedRequest::FailJob(request))
    }

    async fn throw_error(
        &self,
        options: CallOptions,
        request: ThrowErrorRequest,
    ) -> Result<(), RpcError> {
        self.record(Method::ThrowError, &options, RecordedRequest::ThrowError(request))
    }

    async fn update_job_retries(
        &self,
        options: CallOptions,
        request: UpdateJobRetriesRequest,
    ) -> Result<(), RpcError> {
        self.record(Method::UpdateJobRetries, &options, RecordedRequest::UpdateJobRetries(request))
    }

    async fn update_job_timeout(
        &self,
        options: CallOptions,
        request: UpdateJobTimeoutRequest,
    ) -> Result<(), RpcError> {
        self.record(Method::UpdateJobTimeout, &options, RecordedRequest::UpdateJobTimeout(request))
    }

    async fn topology(&self, options: CallOptions) -> Result<TopologyResponse, RpcError> {
        self.record(Method::Topology, &options, RecordedRequest::Topology)?;
        Ok(self.inner.lock().topology.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
