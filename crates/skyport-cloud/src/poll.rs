//! Poll-until-unlocked
//!
//! Remote objects such as containers and database clusters are locked by the
//! control plane while an asynchronous operation is in flight. Mutations are
//! rejected during that window, so lifecycle handlers wait for the lock to
//! clear before (and after) touching them.

use crate::backoff::RetryConfig;
use crate::context::OperationContext;
use crate::error::{CloudError, RemoteError, Result};
use crate::resource::ResourceRef;
use async_trait::async_trait;

/// Reports whether a remote object is currently locked.
#[async_trait]
pub trait LockProbe: Send + Sync {
    async fn is_locked(
        &self,
        namespace: &str,
        name: &str,
    ) -> std::result::Result<bool, RemoteError>;
}

/// Wait until `probe` reports `target` as unlocked.
///
/// The context bounds every probe and interrupts the sleeps.
/// Probe failures are returned as-is without retrying. With a capped
/// `config.max_retries`, a resource that stays locked yields
/// [`CloudError::Exhausted`].
pub async fn wait_for_unlocked<P>(
    ctx: &OperationContext,
    config: &RetryConfig,
    probe: &P,
    target: &ResourceRef,
) -> Result<()>
where
    P: LockProbe + ?Sized,
{
    let mut backoff = config.backoff();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let locked = ctx
            .guard(probe.is_locked(&target.namespace, &target.name))
            .await?;
        if !locked {
            tracing::debug!(resource = %target, attempts, "resource is unlocked");
            return Ok(());
        }

        let Some(delay) = backoff.next() else {
            tracing::warn!(resource = %target, attempts, "gave up waiting for lock");
            return Err(CloudError::Exhausted {
                resource: target.to_string(),
                attempts,
                last_error: "resource is still locked".to_string(),
            });
        };

        tracing::debug!(
            resource = %target,
            attempt = attempts,
            delay_ms = delay.as_millis() as u64,
            "resource is locked, waiting"
        );
        ctx.sleep(delay).await?;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Probe replaying a fixed sequence of answers and recording call times
    pub(crate) struct ScriptedProbe {
        answers: Mutex<VecDeque<std::result::Result<bool, RemoteError>>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedProbe {
        pub(crate) fn new(answers: Vec<std::result::Result<bool, RemoteError>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn locked_then_free(locked_checks: usize) -> Self {
            let mut answers = vec![Ok(true); locked_checks];
            answers.push(Ok(false));
            Self::new(answers)
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Gaps between consecutive probe calls
        pub(crate) fn gaps(&self) -> Vec<Duration> {
            let calls = self.calls.lock().unwrap();
            calls.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    #[async_trait]
    impl LockProbe for ScriptedProbe {
        async fn is_locked(
            &self,
            _namespace: &str,
            _name: &str,
        ) -> std::result::Result<bool, RemoteError> {
            self.calls.lock().unwrap().push(Instant::now());
            self.answers.lock().unwrap().pop_front().unwrap_or(Ok(true))
        }
    }

    fn target() -> ResourceRef {
        ResourceRef::new("container", "prod", "web")
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlocked_on_first_check() {
        let probe = ScriptedProbe::locked_then_free(0);
        let ctx = OperationContext::background();
        let start = Instant::now();

        wait_for_unlocked(&ctx, &RetryConfig::lock_wait(), &probe, &target())
            .await
            .unwrap();

        assert_eq!(probe.call_count(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_double_before_success() {
        let probe = ScriptedProbe::locked_then_free(3);
        let ctx = OperationContext::background();

        wait_for_unlocked(&ctx, &RetryConfig::lock_wait(), &probe, &target())
            .await
            .unwrap();

        assert_eq!(probe.call_count(), 4);
        assert_eq!(
            probe.gaps(),
            vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_are_capped() {
        let probe = ScriptedProbe::locked_then_free(6);
        let ctx = OperationContext::background();
        let config = RetryConfig::lock_wait();

        wait_for_unlocked(&ctx, &config, &probe, &target())
            .await
            .unwrap();

        let gaps = probe.gaps();
        assert_eq!(gaps.len(), 6);
        for pair in gaps.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert!(gaps.iter().all(|g| *g <= config.max_delay));
        assert_eq!(gaps.last(), Some(&Duration::from_secs(15)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_context_skips_probe() {
        let probe = ScriptedProbe::locked_then_free(0);
        let ctx = OperationContext::with_deadline_in(Duration::ZERO);

        let err = wait_for_unlocked(&ctx, &RetryConfig::lock_wait(), &probe, &target())
            .await
            .unwrap_err();

        assert_eq!(err, CloudError::DeadlineExceeded);
        assert_eq!(probe.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_sleep_returns_promptly() {
        let probe = ScriptedProbe::new(vec![]);
        let ctx = OperationContext::background();
        let token = ctx.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            token.cancel();
        });

        let start = Instant::now();
        let err = wait_for_unlocked(&ctx, &RetryConfig::lock_wait(), &probe, &target())
            .await
            .unwrap_err();

        assert_eq!(err, CloudError::Canceled);
        assert_eq!(probe.call_count(), 1);
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_during_sleep() {
        let probe = ScriptedProbe::new(vec![]);
        let ctx = OperationContext::with_deadline_in(Duration::from_secs(30));
        let start = Instant::now();

        let err = wait_for_unlocked(&ctx, &RetryConfig::lock_wait(), &probe, &target())
            .await
            .unwrap_err();

        assert_eq!(err, CloudError::DeadlineExceeded);
        // probes at 0s, 2s, 6s, 14s, 29s; the next 15s sleep is cut at 30s
        assert_eq!(start.elapsed(), Duration::from_secs(30));
        assert_eq!(probe.call_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_error_is_returned_verbatim() {
        let gone = RemoteError::NotFound("container web not found".to_string());
        let probe = ScriptedProbe::new(vec![Ok(true), Err(gone.clone()), Ok(false)]);
        let ctx = OperationContext::background();

        let err = wait_for_unlocked(&ctx, &RetryConfig::lock_wait(), &probe, &target())
            .await
            .unwrap_err();

        assert_eq!(err, CloudError::Remote(gone));
        assert_eq!(probe.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capped_retries_exhaust() {
        let probe = ScriptedProbe::new(vec![]);
        let ctx = OperationContext::background();
        let config = RetryConfig::lock_wait().with_max_retries(4);

        let err = wait_for_unlocked(&ctx, &config, &probe, &target())
            .await
            .unwrap_err();

        match err {
            CloudError::Exhausted {
                resource, attempts, ..
            } => {
                assert_eq!(resource, "container prod/web");
                assert_eq!(attempts, 5);
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
        assert_eq!(probe.call_count(), 5);
    }

    /// Lock check the control plane never answers
    struct StalledLock;

    #[async_trait]
    impl LockProbe for StalledLock {
        async fn is_locked(
            &self,
            _namespace: &str,
            _name: &str,
        ) -> std::result::Result<bool, RemoteError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(false)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_lock_check_stops_at_deadline() {
        let ctx = OperationContext::with_deadline_in(Duration::from_secs(30));
        let start = Instant::now();

        let err = wait_for_unlocked(&ctx, &RetryConfig::lock_wait(), &StalledLock, &target())
            .await
            .unwrap_err();

        assert_eq!(err, CloudError::DeadlineExceeded);
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }
}
