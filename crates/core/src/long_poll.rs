// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server-side long-poll timeout derived from the client deadline.
//!
//! The gateway must give up on a long-polling request slightly before the
//! client deadline fires, so the client sees a clean (possibly empty) response
//! instead of a deadline-cancelled call.

use std::time::Duration;

/// Safety margin subtracted from deadlines longer than the margin itself.
pub const LONG_POLL_OFFSET: Duration = Duration::from_secs(10);

/// Sent as `requestTimeout` when the call has no deadline.
pub const NO_LONG_POLL: i64 = -1;

/// Long-poll timeout for a call with the given deadline.
///
/// Deadlines above [`LONG_POLL_OFFSET`] lose the full offset (60s -> 50s);
/// shorter ones lose a tenth (5s -> 4.5s). Never negative.
pub fn long_poll_timeout(deadline: Duration) -> Duration {
    let offset = if deadline > LONG_POLL_OFFSET { LONG_POLL_OFFSET } else { deadline / 10 };
    deadline.saturating_sub(offset)
}

/// The `requestTimeout` field value in milliseconds, or [`NO_LONG_POLL`].
pub fn long_poll_millis(deadline: Option<Duration>) -> i64 {
    match deadline {
        Some(d) => i64::try_from(long_poll_timeout(d).as_millis()).unwrap_or(i64::MAX),
        None => NO_LONG_POLL,
    }
}

#[cfg(test)]
#[path = "long_poll_tests.rs"]
mod tests;
