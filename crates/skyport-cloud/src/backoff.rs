//! Exponential backoff schedule

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backoff parameters for lock polling and delete retries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Upper bound for any single delay
    pub max_delay: Duration,

    /// Maximum number of retries (sleeps); `None` leaves the bound to the
    /// operation context
    pub max_retries: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::lock_wait()
    }
}

impl RetryConfig {
    /// Lock polling: 2s doubling up to 15s, bounded only by the context
    pub fn lock_wait() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(15),
            max_retries: None,
        }
    }

    /// Delete retries while the remote object is locked
    pub fn delete() -> Self {
        Self {
            max_retries: Some(10),
            ..Self::lock_wait()
        }
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(self)
    }
}

/// Iterator over the delays of a retry loop.
///
/// Yields `initial_delay`, then doubles on every step, clamped to
/// `max_delay`. Ends after `max_retries` delays when a cap is set.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max_delay: Duration,
    remaining: Option<u32>,
}

impl Backoff {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            next: config.initial_delay.min(config.max_delay),
            max_delay: config.max_delay,
            remaining: config.max_retries,
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }

        let delay = self.next;
        self.next = delay.saturating_mul(2).min(self.max_delay);
        Some(delay)
    }
}
