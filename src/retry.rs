//! Bounded retry with exponential backoff for flaky remote calls.

use crate::config::Config;
use crate::error::PipelineError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of an operation run through [`RetryPolicy::execute`].
///
/// The error side is always [`PipelineError::RetryExhausted`].
pub type RetryOutcome<T> = Result<T, PipelineError>;

/// Retries a fallible async operation, sleeping `base * 2^(n-1)` after the n-th failure.
///
/// | failed attempt | sleep before next |
/// |----------------|-------------------|
/// | 1              | 1 × base          |
/// | 2              | 2 × base          |
/// | 3              | 4 × base          |
///
/// Every error is retried until the attempt budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_millis(1000) }
    }
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_delay }
    }

    /// Builds the policy described by the configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.retry_base_delay_ms))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay slept after the given 1-based failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Runs `operation` until it succeeds or the attempt budget is spent.
    pub async fn execute<T, F, Fut>(&self, name: &str, mut operation: F) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PipelineError>>,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}", name, attempt);
                    }
                    return Ok(value);
                }
                Err(err) => {
                    if attempt >= self.max_attempts {
                        warn!("{} giving up after {} attempt(s): {}", name, attempt, err);
                        return Err(PipelineError::RetryExhausted {
                            operation: name.to_string(),
                            attempts: attempt,
                            source: Box::new(err),
                        });
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {}ms",
                        name,
                        attempt,
                        self.max_attempts,
                        err,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn flaky() -> PipelineError {
        PipelineError::transport("test", "connection reset")
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(4000));
    }

    #[test]
    fn test_max_attempts_clamped() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.max_attempts = 5;
        config.retry_base_delay_ms = 250;

        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.delay_for(2), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let result = RetryPolicy::default()
            .execute("op", || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, PipelineError>(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds_with_backoff() {
        let starts = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&starts);

        let result = RetryPolicy::default()
            .execute("flaky op", || {
                let s = Arc::clone(&s);
                async move {
                    let mut starts = s.lock().unwrap();
                    starts.push(Instant::now());
                    if starts.len() < 3 {
                        Err(flaky())
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");

        let starts = starts.lock().unwrap();
        assert_eq!(starts.len(), 3);

        let first_gap = starts[1] - starts[0];
        let second_gap = starts[2] - starts[1];
        assert!(first_gap >= Duration::from_millis(1000) && first_gap < Duration::from_millis(1010));
        assert!(second_gap >= Duration::from_millis(2000) && second_gap < Duration::from_millis(2010));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_wraps_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let result = RetryPolicy::default()
            .execute("image search", || {
                let c = Arc::clone(&c);
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                    Err::<(), _>(PipelineError::transport("api", format!("failure {}", n)))
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(PipelineError::RetryExhausted { operation, attempts, source }) => {
                assert_eq!(operation, "image search");
                assert_eq!(attempts, 3);
                assert!(source.to_string().contains("failure 3"));
            }
            other => panic!("expected RetryExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_errors_use_full_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let result = RetryPolicy::new(3, Duration::ZERO)
            .execute("page fetch", || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(PipelineError::HttpStatus { status: 404, target: "shop".into() })
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(PipelineError::RetryExhausted { attempts: 3, .. })));
    }

    #[tokio::test]
    async fn test_parse_error_retried_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let result = RetryPolicy::new(3, Duration::ZERO)
            .execute("image search", || {
                let c = Arc::clone(&c);
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(PipelineError::Parse("truncated JSON".into()))
                    } else {
                        Ok("link")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "link");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_parse_error_exhausts_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let result = RetryPolicy::new(3, Duration::ZERO)
            .execute("image search", || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(PipelineError::Parse("bad".into()))
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(PipelineError::RetryExhausted { attempts, source, .. }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, PipelineError::Parse(_)));
            }
            other => panic!("expected RetryExhausted, got {:?}", other),
        }
    }
}
