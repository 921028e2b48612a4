//! Retry loop: run an async operation until success or policy says stop.

use std::future::Future;

use super::policy::{ErrorKind, RetryDecision, RetryPolicy};

/// Runs `op` until it succeeds or the policy says to stop. On a retryable
/// failure, sleeps for the backoff duration then tries again. Returns the
/// last error when attempts are exhausted.
pub async fn run_with_retry<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    classify: C,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> ErrorKind,
    E: std::fmt::Display,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => match policy.decide(attempt, classify(&e)) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(delay) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "operation failed, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn quick_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<u32, String> =
            run_with_retry(&quick_policy(5), |_| ErrorKind::Throttled, || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("flaky".to_string())
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_attempt_ceiling() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<(), String> =
            run_with_retry(&quick_policy(3), |_| ErrorKind::Connection, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("down".to_string())
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_errors_fail_immediately() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<(), String> =
            run_with_retry(&quick_policy(5), |_| ErrorKind::Other, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("bad request".to_string())
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
