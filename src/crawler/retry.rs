//! Retry strategy for page fetches
//!
//! Crawls are single-shot by default: [`NoRetry`] hands the first failure
//! straight back. [`ExponentialBackoff`] can be injected instead, either
//! from the `[retry]` configuration section or directly by library callers.

use crate::browser::{BrowserContext, NavigationOptions};
use crate::config::RetryConfig;
use crate::crawler::fetcher::{fetch_page, LoadedDocument};
use crate::records::FetchFailure;
use std::sync::Arc;
use std::time::Duration;

/// Longest wait between two attempts, whatever the policy computes
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Decides how often and how long to wait before re-fetching a page
pub trait RetryPolicy: Send + Sync {
    /// Number of additional attempts after the first failure
    fn max_retries(&self) -> u32;

    /// Delay before retry number `attempt` (1-based)
    fn backoff(&self, attempt: u32) -> Duration;
}

/// Never retries
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn max_retries(&self) -> u32 {
        0
    }

    fn backoff(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}

/// Retries with a geometrically growing delay
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    pub max_retries: u32,
    pub initial: Duration,
    pub multiplier: f64,
}

impl RetryPolicy for ExponentialBackoff {
    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let seconds = self.initial.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(seconds)
            .map(|delay| delay.min(MAX_BACKOFF))
            .unwrap_or(MAX_BACKOFF)
    }
}

/// Builds the policy described by the configuration
pub fn retry_policy_from_config(config: &RetryConfig) -> Arc<dyn RetryPolicy> {
    if config.max_retries == 0 {
        Arc::new(NoRetry)
    } else {
        Arc::new(ExponentialBackoff {
            max_retries: config.max_retries,
            initial: Duration::from_millis(config.initial_backoff_ms),
            multiplier: config.backoff_multiplier,
        })
    }
}

/// Fetches a page, re-attempting failures as the policy allows
///
/// Returns the last failure once attempts are exhausted.
pub async fn fetch_with_retry(
    context: &dyn BrowserContext,
    url: &str,
    options: &NavigationOptions,
    policy: &dyn RetryPolicy,
) -> Result<LoadedDocument, FetchFailure> {
    let mut attempt = 0;
    loop {
        match fetch_page(context, url, options).await {
            Ok(document) => return Ok(document),
            Err(failure) if attempt < policy.max_retries() => {
                attempt += 1;
                let delay = policy.backoff(attempt);
                tracing::warn!(
                    "Fetch of {} failed ({}), retry {}/{} in {:?}",
                    url,
                    failure.message,
                    attempt,
                    policy.max_retries(),
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(failure) => return Err(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserError, PageResponse};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` navigations, then succeeds
    struct FlakyContext {
        failures: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BrowserContext for FlakyContext {
        async fn navigate(
            &self,
            url: &str,
            _options: &NavigationOptions,
        ) -> Result<Option<PageResponse>, BrowserError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let status = if call < self.failures { 503 } else { 200 };
            Ok(Some(PageResponse {
                url: url.to_string(),
                status,
                body: "<html></html>".to_string(),
            }))
        }

        async fn close(&self) -> Result<(), BrowserError> {
            Ok(())
        }
    }

    fn fast_backoff(max_retries: u32) -> ExponentialBackoff {
        ExponentialBackoff {
            max_retries,
            initial: Duration::from_millis(1),
            multiplier: 1.0,
        }
    }

    #[test]
    fn test_no_retry_policy() {
        assert_eq!(NoRetry.max_retries(), 0);
        assert_eq!(NoRetry.backoff(1), Duration::ZERO);
    }

    #[test]
    fn test_exponential_backoff_growth() {
        let policy = ExponentialBackoff {
            max_retries: 3,
            initial: Duration::from_millis(100),
            multiplier: 2.0,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = ExponentialBackoff {
            max_retries: 5,
            initial: Duration::from_secs(1),
            multiplier: 1e20,
        };
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), MAX_BACKOFF);
        assert_eq!(policy.backoff(5), MAX_BACKOFF);

        let unbounded = ExponentialBackoff {
            max_retries: 2,
            initial: Duration::from_millis(10),
            multiplier: f64::INFINITY,
        };
        assert_eq!(unbounded.backoff(2), MAX_BACKOFF);
        assert_eq!(unbounded.backoff(u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn test_policy_from_default_config_never_retries() {
        let policy = retry_policy_from_config(&RetryConfig::default());
        assert_eq!(policy.max_retries(), 0);
    }

    #[test]
    fn test_policy_from_config_with_retries() {
        let config = RetryConfig {
            max_retries: 2,
            initial_backoff_ms: 50,
            backoff_multiplier: 3.0,
        };
        let policy = retry_policy_from_config(&config);
        assert_eq!(policy.max_retries(), 2);
        assert_eq!(policy.backoff(2), Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_no_retry_makes_one_attempt() {
        let context = FlakyContext {
            failures: 1,
            calls: AtomicUsize::new(0),
        };
        let result = fetch_with_retry(
            &context,
            "https://example.com/",
            &NavigationOptions::default(),
            &NoRetry,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(context.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let context = FlakyContext {
            failures: 2,
            calls: AtomicUsize::new(0),
        };
        let result = fetch_with_retry(
            &context,
            "https://example.com/",
            &NavigationOptions::default(),
            &fast_backoff(2),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(context.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_returns_last_failure_when_exhausted() {
        let context = FlakyContext {
            failures: 10,
            calls: AtomicUsize::new(0),
        };
        let failure = fetch_with_retry(
            &context,
            "https://example.com/",
            &NavigationOptions::default(),
            &fast_backoff(2),
        )
        .await
        .unwrap_err();

        assert!(failure.message.contains("503"));
        assert_eq!(context.calls.load(Ordering::SeqCst), 3);
    }
}
