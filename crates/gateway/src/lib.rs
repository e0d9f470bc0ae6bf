// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! zb-gateway: Gateway RPC surface consumed by the job-worker runtime.

mod error;
mod messages;
mod metadata;
mod stub;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod fake;

pub use error::{ErrorClass, RpcCode, RpcError};
pub use messages::{
    ActivateJobsRequest, ActivateJobsResponse, ActivatedJob, BrokerInfo, CompleteJobRequest,
    FailJobRequest, Partition, PartitionHealth, PartitionRole, StreamActivatedJobsRequest,
    ThrowErrorRequest, TopologyResponse, UpdateJobRetriesRequest, UpdateJobTimeoutRequest,
};
pub use metadata::{Metadata, AUTHORIZATION};
pub use stub::{CallOptions, Gateway, ResponseStream};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeGateway, Method, RecordedCall, RecordedRequest, StreamEnd, StreamScript};
