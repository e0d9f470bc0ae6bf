// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! zb-worker: Job worker runtime.
//!
//! A worker polls (and optionally streams) activated jobs into a bounded
//! queue and runs a handler for each on a fixed number of slots:
//!
//! ```ignore
//! let worker = JobWorkerBuilder::new(client)
//!     .job_type("payment")
//!     .handler(|client: JobClient, job: Job| async move { /* complete or fail */ })
//!     .concurrency(8)
//!     .open();
//! worker.close().await;
//! ```

mod builder;
mod client;
mod config;
mod dispatcher;
mod handler;
mod poller;
mod remaining;
mod streamer;
mod worker;

#[cfg(test)]
mod test_helpers;

pub use builder::{
    HasHandler, HasJobType, JobWorkerBuilder, NoHandler, NoJobType, DEFAULT_CONCURRENCY,
    DEFAULT_JOB_TIMEOUT, DEFAULT_MAX_JOBS_ACTIVE, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_THRESHOLD,
    DEFAULT_WORKER_NAME,
};
pub use client::{JobClient, DEFAULT_REQUEST_TIMEOUT};
pub use config::{
    ClientConfig, ConfigError, ResolvedClientConfig, DEFAULT_GATEWAY_ADDRESS, DEFAULT_KEEP_ALIVE,
};
pub use handler::JobHandler;
pub use worker::JobWorker;
