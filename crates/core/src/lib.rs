// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! zb-core: Data model and shared utilities for the Zeebe job-worker client

pub mod macros;

pub mod backoff;
pub mod clock;
pub mod env;
pub mod job;
pub mod long_poll;
pub mod metrics;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use backoff::{BackoffSupplier, ExponentialBackoff, ExponentialBackoffBuilder};
pub use clock::{Clock, FakeClock, SystemClock};
pub use env::{EnvLookup, MapEnv, ProcessEnv};
pub use job::{Job, JobKey, JobPayloadError};
pub use long_poll::{long_poll_millis, long_poll_timeout, NO_LONG_POLL};
pub use metrics::{JobWorkerMetrics, NoopMetrics};
