// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry delay suppliers.
//!
//! The poller uses these to stretch its interval after failed activations,
//! and the streamer to space out reopen attempts after a stream error.

use rand::Rng;
use std::time::Duration;

/// Computes the next retry delay from the previous one.
///
/// `current` is zero on the first failure after a success.
pub trait BackoffSupplier: Send + Sync {
    fn supply_retry_delay(&self, current: Duration) -> Duration;
}

impl<F> BackoffSupplier for F
where
    F: Fn(Duration) -> Duration + Send + Sync,
{
    fn supply_retry_delay(&self, current: Duration) -> Duration {
        self(current)
    }
}

pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(50);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_FACTOR: f64 = 1.6;
pub const DEFAULT_JITTER: f64 = 0.1;

/// Exponential backoff with clamping and symmetric jitter.
///
/// Each delay is `clamp(current * factor, min, max)`, then scaled by a random
/// value in `[1 - jitter, 1 + jitter]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    min_delay: Duration,
    max_delay: Duration,
    factor: f64,
    jitter: f64,
}

impl ExponentialBackoff {
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// The delay before jitter is applied.
    ///
    /// Saturates at `max_delay`, which may be as large as `Duration::MAX`.
    pub fn base_delay(&self, current: Duration) -> Duration {
        let next = current.as_secs_f64() * self.factor;
        let clamped = next.clamp(self.min_delay.as_secs_f64(), self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(clamped).unwrap_or(self.max_delay)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BackoffSupplier for ExponentialBackoff {
    fn supply_retry_delay(&self, current: Duration) -> Duration {
        let base = self.base_delay(current);
        if self.jitter <= 0.0 {
            return base;
        }
        let scale = 1.0 + rand::thread_rng().gen_range(-self.jitter..=self.jitter);
        Duration::try_from_secs_f64((base.as_secs_f64() * scale).max(0.0)).unwrap_or(Duration::MAX)
    }
}

pub struct ExponentialBackoffBuilder {
    min_delay: Duration,
    max_delay: Duration,
    factor: f64,
    jitter: f64,
}

impl Default for ExponentialBackoffBuilder {
    fn default() -> Self {
        Self {
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            factor: DEFAULT_FACTOR,
            jitter: DEFAULT_JITTER,
        }
    }
}

impl ExponentialBackoffBuilder {
    crate::setters! {
        set {
            min_delay: Duration,
            max_delay: Duration,
            factor: f64,
            jitter: f64,
        }
    }

    /// Build the supplier. A `max_delay` below `min_delay` is raised to it,
    /// a factor below 1 becomes 1, and jitter is clamped into `[0, 1]`.
    pub fn build(self) -> ExponentialBackoff {
        ExponentialBackoff {
            min_delay: self.min_delay,
            max_delay: self.max_delay.max(self.min_delay),
            factor: if self.factor.is_finite() { self.factor.max(1.0) } else { DEFAULT_FACTOR },
            jitter: if self.jitter.is_finite() { self.jitter.clamp(0.0, 1.0) } else { 0.0 },
        }
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
