//! Cancellable, deadline-bounded operation context

use crate::error::{CloudError, Result};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Context handed to every lifecycle operation.
///
/// Carries an optional deadline and a cancellation token. Children created
/// with [`OperationContext::with_timeout`] never outlive their parent.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl OperationContext {
    /// Context without deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now
    pub fn with_deadline_in(timeout: Duration) -> Self {
        Self::background().with_timeout(timeout)
    }

    /// Derive a child context bounded by `timeout`.
    ///
    /// Cancelling the parent cancels the child; cancelling the child leaves
    /// the parent untouched.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) if parent < candidate => parent,
            _ => candidate,
        };
        Self {
            deadline: Some(deadline),
            cancel: self.cancel.child_token(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Report whether the context is already done
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(CloudError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(CloudError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drive a remote call to completion unless the context ends first.
    pub async fn guard<T, E, F>(&self, call: F) -> Result<T>
    where
        F: std::future::Future<Output = std::result::Result<T, E>>,
        E: Into<CloudError>,
    {
        self.check()?;

        let outcome = match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.cancel.cancelled() => return Err(CloudError::Canceled),
                    _ = tokio::time::sleep_until(deadline) => {
                        return Err(CloudError::DeadlineExceeded);
                    }
                    outcome = call => outcome,
                }
            }
            None => {
                tokio::select! {
                    _ = self.cancel.cancelled() => return Err(CloudError::Canceled),
                    outcome = call => outcome,
                }
            }
        };
        outcome.map_err(Into::into)
    }

    /// Sleep for `duration`, waking early when the context ends.
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.check()?;

        let wake = Instant::now() + duration;
        match self.deadline {
            Some(deadline) if deadline <= wake => {
                tokio::select! {
                    _ = self.cancel.cancelled() => Err(CloudError::Canceled),
                    _ = tokio::time::sleep_until(deadline) => Err(CloudError::DeadlineExceeded),
                }
            }
            _ => {
                tokio::select! {
                    _ = self.cancel.cancelled() => Err(CloudError::Canceled),
                    _ = tokio::time::sleep_until(wake) => Ok(()),
                }
            }
        }
    }
}
