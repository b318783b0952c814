//! Rate-limit retry loop.
//!
//! The loop operates on [`Result`] values; the only variant that triggers
//! another attempt is [`CategorizeError::RateLimited`]. Backoff waits go
//! through the [`Sleep`] trait so tests can assert the schedule without real
//! delays.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::warn;

use crate::error::{CategorizeError, Result};

/// Backoff schedule for rate-limited completion calls: a fixed number of
/// retries with a doubling delay (1000 ms, 2000 ms, 4000 ms by default).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

/// Abstraction over backoff waits. Production code uses [`TokioSleep`]; tests
/// substitute a recording double.
#[async_trait]
pub trait Sleep: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleep`] backed by `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleep;

#[async_trait]
impl Sleep for TokioSleep {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// exhausts the rate-limit budget.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, sleep: &dyn Sleep, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retries = policy.max_retries;
    let mut delay = policy.initial_delay;
    loop {
        match operation().await {
            Err(CategorizeError::RateLimited { .. }) if retries > 0 => {
                warn!("rate limited, retrying in {}ms", delay.as_millis());
                sleep.sleep(delay).await;
                retries -= 1;
                delay *= 2;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingSleep {
        delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleep {
        fn delays(&self) -> Vec<Duration> {
            self.delays.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleep for RecordingSleep {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    fn rate_limited() -> CategorizeError {
        CategorizeError::RateLimited { retry_after: None }
    }

    #[tokio::test]
    async fn success_on_first_attempt_never_sleeps() {
        let sleep = RecordingSleep::default();
        let result = with_retry(RetryPolicy::default(), &sleep, || async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
        assert!(sleep.delays().is_empty());
    }

    #[tokio::test]
    async fn retries_rate_limits_with_doubling_delay() {
        let sleep = RecordingSleep::default();
        let attempts = AtomicUsize::new(0);
        let result = with_retry(RetryPolicy::default(), &sleep, || async {
            if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(rate_limited())
            } else {
                Ok("done")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(
            sleep.delays(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
    }

    #[tokio::test]
    async fn exhausted_budget_propagates_the_rate_limit() {
        let sleep = RecordingSleep::default();
        let attempts = AtomicUsize::new(0);
        let result: Result<()> = with_retry(RetryPolicy::default(), &sleep, || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(rate_limited())
        })
        .await;
        assert!(matches!(result, Err(CategorizeError::RateLimited { .. })));
        // Initial attempt plus three retries.
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        assert_eq!(
            sleep.delays(),
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(4000),
            ]
        );
    }

    #[tokio::test]
    async fn non_retryable_errors_fail_immediately() {
        let sleep = RecordingSleep::default();
        let attempts = AtomicUsize::new(0);
        let result: Result<()> = with_retry(RetryPolicy::default(), &sleep, || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(CategorizeError::EmptyResponse)
        })
        .await;
        assert!(matches!(result, Err(CategorizeError::EmptyResponse)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(sleep.delays().is_empty());
    }
}
