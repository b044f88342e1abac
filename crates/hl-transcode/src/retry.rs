//! Retry utilities with exponential backoff.
//!
//! Used for job status queries, which hit a remote API that can fail
//! transiently while the job itself keeps running.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Base delay for exponential backoff (doubles each attempt).
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Operation name for logging.
    pub operation_name: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            operation_name: "operation".to_string(),
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with the given operation name.
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            ..Default::default()
        }
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base delay for exponential backoff.
    #[cfg(test)]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the cap on a single backoff delay.
    #[cfg(test)]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay before retry number `attempt + 1`; attempt 0 waits `base_delay`.
    pub(crate) fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Result of a retry operation.
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// Operation succeeded.
    Success(T),
    /// Operation failed after all retries exhausted (or the deadline hit).
    Failed { error: E, attempts: u32 },
}

impl<T, E> RetryResult<T, E> {
    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success(_))
    }

    /// Convert into a plain `Result`, dropping the attempt count.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryResult::Success(v) => Ok(v),
            RetryResult::Failed { error, .. } => Err(error),
        }
    }
}

/// Execute an async operation with retry logic.
///
/// No retry is started whose backoff would end after `deadline`; the last
/// error is returned instead.
///
/// # Example
/// ```ignore
/// let config = RetryConfig::new("get_job").with_max_retries(3);
/// let result = retry_async(&config, None, || provider.get_job(&id)).await;
/// ```
pub async fn retry_async<F, Fut, T, E>(
    config: &RetryConfig,
    deadline: Option<Instant>,
    operation: F,
) -> RetryResult<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return RetryResult::Success(value),
            Err(e) if attempt < config.max_retries => {
                let delay = config.delay_for_attempt(attempt);
                attempt += 1;
                if deadline.is_some_and(|d| Instant::now() + delay > d) {
                    return RetryResult::Failed {
                        error: e,
                        attempts: attempt,
                    };
                }
                debug!(
                    "{} attempt {} failed, retrying in {:?}: {}",
                    config.operation_name, attempt, delay, e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return RetryResult::Failed {
                    error: e,
                    attempts: attempt + 1,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_retry_config_delay_calculation() {
        let config = RetryConfig::new("test").with_base_delay(Duration::from_millis(100));

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(800));
    }

    #[test]
    fn test_retry_config_max_delay() {
        let config = RetryConfig::new("test")
            .with_base_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(5));

        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(5));
        assert_eq!(config.delay_for_attempt(40), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_no_retries_by_default() {
        let config = RetryConfig::new("test");
        let calls = AtomicU32::new(0);

        let result = retry_async(&config, None, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<u32, _>("boom") }
        })
        .await;

        assert!(!result.is_success());
        assert!(matches!(result, RetryResult::Failed { attempts: 1, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_async_eventual_success() {
        let config = RetryConfig::new("test")
            .with_max_retries(3)
            .with_base_delay(Duration::from_millis(10));
        let calls = AtomicU32::new(0);

        let result = retry_async(&config, None, || {
            let count = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 2 {
                    Err("transient error")
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.into_result(), Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_stops_at_deadline() {
        let config = RetryConfig::new("test")
            .with_max_retries(10)
            .with_base_delay(Duration::from_secs(1));
        let calls = AtomicU32::new(0);
        let deadline = Instant::now() + Duration::from_secs(5);

        let result = retry_async(&config, Some(deadline), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<u32, _>("down") }
        })
        .await;

        assert!(!result.is_success());
        // Backoffs of 1s, 2s, then 4s: the third would overrun the 5s deadline.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(Instant::now() <= deadline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_retry_waits_base_delay() {
        let config = RetryConfig::new("test").with_max_retries(1);
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result = retry_async(&config, None, || {
            let count = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if count == 0 {
                    Err("throttled")
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.into_result(), Ok(7));
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }
}
