//! Polling configuration and deadlines
//!
//! The coordinator's wait loop is driven by three knobs:
//! - `interval`: sleep between two status queries
//! - `timeout`: overall wall-clock budget for the wait
//! - `max_status_retries`: consecutive failed queries tolerated before
//!   the remote is declared unavailable
//!
//! The loop always sleeps before querying, so two queries are never closer
//! than one interval apart.

use std::time::{Duration, Instant};

/// Longest wait accepted, one day
pub const MAX_TIMEOUT: Duration = Duration::from_secs(86_400);

/// Polling configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before each status query (default: 2s)
    pub interval: Duration,

    /// Overall wait budget (default: 1800s = 30 min)
    pub timeout: Duration,

    /// Consecutive failed queries tolerated (default: 3)
    pub max_status_retries: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(1800),
            max_status_retries: 3,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            ..Self::default()
        }
    }

    pub fn with_max_status_retries(mut self, retries: u32) -> Self {
        self.max_status_retries = retries;
        self
    }

    /// Validate polling bounds
    pub fn validate(&self) -> Result<(), PollValidationError> {
        if self.interval.is_zero() {
            return Err(PollValidationError::ZeroInterval);
        }

        // timeout must be in (0, MAX_TIMEOUT]
        if self.timeout.is_zero() || self.timeout > MAX_TIMEOUT {
            return Err(PollValidationError::TimeoutOutOfBounds {
                value: self.timeout,
            });
        }

        Ok(())
    }
}

/// Polling validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollValidationError {
    #[error("poll interval must be greater than zero")]
    ZeroInterval,

    #[error("timeout must be in (0, 86400s], got {value:?}")]
    TimeoutOutOfBounds { value: Duration },
}

/// Fixed point in time after which waiting stops.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    timeout: Duration,
}

impl Deadline {
    /// Start the clock now
    pub fn after(timeout: Duration) -> Self {
        Self {
            start: Instant::now(),
            timeout,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time left, zero once expired
    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.timeout
    }

    /// The next sleep: one interval, cut short at the deadline
    pub fn next_wait(&self, interval: Duration) -> Duration {
        interval.min(self.remaining())
    }
}
