//! Retry-on-locked for mutating calls
//!
//! Mutating an object the control plane is still working on fails with a
//! "locked" error, even right after a lock poll reported it free. The call
//! itself is retried with backoff until it goes through or the retry budget
//! runs out. Deletes additionally treat a vanished object as done.

use crate::backoff::{Backoff, RetryConfig};
use crate::context::OperationContext;
use crate::error::{CloudError, RemoteError, Result};
use crate::resource::ResourceRef;
use std::future::Future;

/// How a retried delete concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The delete call succeeded
    Deleted,
    /// The object no longer existed
    AlreadyGone,
}

/// Run `delete` until it succeeds, retrying while the remote side reports
/// the object as locked.
///
/// A not-found response counts as success. Running out of retries, or
/// hitting the context deadline while still locked, yields
/// [`CloudError::Exhausted`] carrying the last remote error. Any other
/// remote error is returned immediately.
pub async fn delete_with_retry<F, Fut>(
    ctx: &OperationContext,
    config: &RetryConfig,
    target: &ResourceRef,
    mut delete: F,
) -> Result<DeleteOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<(), RemoteError>>,
{
    let mut backoff = config.backoff();
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        let last_error = match ctx.guard(delete()).await {
            Ok(()) => {
                tracing::info!(resource = %target, attempts, "deleted");
                return Ok(DeleteOutcome::Deleted);
            }
            Err(CloudError::Remote(RemoteError::NotFound(msg))) => {
                tracing::debug!(resource = %target, %msg, "already deleted");
                return Ok(DeleteOutcome::AlreadyGone);
            }
            Err(CloudError::Remote(RemoteError::Locked(msg))) => msg,
            Err(other) => return Err(other),
        };

        back_off(ctx, &mut backoff, target, attempts, last_error, "delete").await?;
    }
}

/// Run `mutate` until it succeeds, retrying while the remote side reports
/// the object as locked.
///
/// Each call is bounded by the context. Running out of retries, or hitting
/// the context deadline while still locked, yields [`CloudError::Exhausted`]
/// carrying the last remote error. Not-found and other remote errors are
/// returned immediately.
pub async fn mutate_with_retry<F, Fut, T>(
    ctx: &OperationContext,
    config: &RetryConfig,
    target: &ResourceRef,
    mut mutate: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, RemoteError>>,
{
    let mut backoff = config.backoff();
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        let last_error = match ctx.guard(mutate()).await {
            Ok(output) => return Ok(output),
            Err(CloudError::Remote(RemoteError::Locked(msg))) => msg,
            Err(other) => return Err(other),
        };

        back_off(ctx, &mut backoff, target, attempts, last_error, "mutation").await?;
    }
}

/// Sleep before the next attempt, or give up with [`CloudError::Exhausted`].
async fn back_off(
    ctx: &OperationContext,
    backoff: &mut Backoff,
    target: &ResourceRef,
    attempts: u32,
    last_error: String,
    action: &str,
) -> Result<()> {
    let exhausted = |last_error: String| CloudError::Exhausted {
        resource: target.to_string(),
        attempts,
        last_error,
    };

    let Some(delay) = backoff.next() else {
        return Err(exhausted(last_error));
    };

    tracing::warn!(
        resource = %target,
        attempt = attempts,
        delay_ms = delay.as_millis() as u64,
        "{} rejected while locked, retrying",
        action
    );

    match ctx.sleep(delay).await {
        Ok(()) => Ok(()),
        Err(CloudError::DeadlineExceeded) => Err(exhausted(last_error)),
        Err(e) => Err(e),
    }
}
