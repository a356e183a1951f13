//! One retry-with-backoff loop shared by every feed resource

use super::error_handler::ErrorHandler;
use crate::consts::cli_consts::feed_fetching;
use crate::feed::error::FeedError;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the cache-buster query value is produced.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBustStrategy {
    /// Milliseconds since the epoch, bumped when two requests land in the same millisecond.
    #[default]
    Timestamp,
    /// 1, 2, 3, ... for this process.
    Counter,
    /// No query parameter.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub cache_bust: CacheBustStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: feed_fetching::MAX_ATTEMPTS,
            base_delay: feed_fetching::base_delay(),
            cache_bust: CacheBustStrategy::default(),
        }
    }
}

impl RetryConfig {
    /// Delay after the `attempt`-th failure (1-based): `attempt * base_delay`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// A config that allows zero attempts still makes one request.
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Retries exhausted (or an error that is not worth retrying).
#[derive(Debug, Error)]
#[error("{error} (after {attempts} attempt(s))")]
pub struct RetryFailure {
    pub error: FeedError,
    pub attempts: u32,
}

/// Produces strictly increasing cache-buster values.
#[derive(Debug, Default)]
pub struct CacheBuster {
    strategy: CacheBustStrategy,
    last: AtomicU64,
}

impl CacheBuster {
    pub fn new(strategy: CacheBustStrategy) -> Self {
        Self {
            strategy,
            last: AtomicU64::new(0),
        }
    }

    pub fn next(&self) -> Option<u64> {
        match self.strategy {
            CacheBustStrategy::Disabled => None,
            CacheBustStrategy::Counter => Some(self.last.fetch_add(1, Ordering::SeqCst) + 1),
            CacheBustStrategy::Timestamp => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or_default();
                let previous = self
                    .last
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                        Some(now.max(last + 1))
                    })
                    .unwrap_or_default();
                Some(now.max(previous + 1))
            }
        }
    }
}

/// Run `request` until it succeeds, the error is not retryable, or attempts run out.
/// Every attempt gets a fresh cache-buster value.
pub async fn fetch_with_retry<T, F, Fut>(
    config: &RetryConfig,
    cache_buster: &CacheBuster,
    error_handler: &ErrorHandler,
    mut request: F,
) -> Result<T, RetryFailure>
where
    F: FnMut(Option<u64>) -> Fut,
    Fut: Future<Output = Result<T, FeedError>>,
{
    let max_attempts = config.effective_attempts();
    let mut attempts = 0;

    loop {
        attempts += 1;
        match request(cache_buster.next()).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempts >= max_attempts || !error_handler.should_retry(&error) {
                    return Err(RetryFailure { error, attempts });
                }
                let delay = config.backoff_for(attempts);
                log::debug!(
                    "Attempt {}/{} failed ({}), retrying in {:?}",
                    attempts,
                    max_attempts,
                    error,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
