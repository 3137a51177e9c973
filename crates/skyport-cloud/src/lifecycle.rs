//! Lock-guarded mutation template
//!
//! `wait_unlocked → mutate → wait_unlocked → refetch`, with the lock waits
//! switched on per resource type. The mutation is retried while the control
//! plane still rejects it as locked.

use crate::backoff::RetryConfig;
use crate::context::OperationContext;
use crate::error::{RemoteError, Result};
use crate::poll::{LockProbe, wait_for_unlocked};
use crate::resource::ResourceRef;
use crate::retry::mutate_with_retry;
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedMutation {
    /// Wait for the lock to clear before mutating
    pub wait_before: bool,
    /// Wait for the lock taken by the mutation to clear afterwards
    pub wait_after: bool,
}

impl LockedMutation {
    /// Wait on both sides of the mutation
    pub const GUARDED: Self = Self {
        wait_before: true,
        wait_after: true,
    };

    /// Only wait for the mutation to settle
    pub const SETTLE: Self = Self {
        wait_before: false,
        wait_after: true,
    };

    /// Only wait before mutating
    pub const PRECHECK: Self = Self {
        wait_before: true,
        wait_after: false,
    };

    /// Run `mutate` between the configured lock waits.
    pub async fn run<P, M, MFut, T>(
        &self,
        ctx: &OperationContext,
        poll: &RetryConfig,
        probe: &P,
        target: &ResourceRef,
        mutate: M,
    ) -> Result<T>
    where
        P: LockProbe + ?Sized,
        M: FnMut() -> MFut,
        MFut: Future<Output = std::result::Result<T, RemoteError>>,
    {
        if self.wait_before {
            wait_for_unlocked(ctx, poll, probe, target).await?;
        }

        tracing::info!(resource = %target, "applying mutation");
        let output = mutate_with_retry(ctx, poll, target, mutate).await?;

        if self.wait_after {
            wait_for_unlocked(ctx, poll, probe, target).await?;
        }

        Ok(output)
    }

    /// Run the template and return the refetched representation.
    pub async fn run_then_refetch<P, M, MFut, T, R, RFut, U>(
        &self,
        ctx: &OperationContext,
        poll: &RetryConfig,
        probe: &P,
        target: &ResourceRef,
        mutate: M,
        refetch: R,
    ) -> Result<U>
    where
        P: LockProbe + ?Sized,
        M: FnMut() -> MFut,
        MFut: Future<Output = std::result::Result<T, RemoteError>>,
        R: FnOnce() -> RFut,
        RFut: Future<Output = std::result::Result<U, RemoteError>>,
    {
        self.run(ctx, poll, probe, target, mutate).await?;
        ctx.guard(refetch()).await
    }
}
