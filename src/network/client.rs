//! Network client with built-in retry and error handling

use super::error_handler::ErrorHandler;
use super::retry::{CacheBuster, RetryConfig, RetryFailure, fetch_with_retry};
use crate::feed::FeedSource;
use crate::types::{Asset, LastUpdate, ScanMeta};

/// Network client with built-in retry and cache-busting
#[derive(Debug)]
pub struct NetworkClient {
    config: RetryConfig,
    error_handler: ErrorHandler,
    cache_buster: CacheBuster,
}

impl NetworkClient {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            cache_buster: CacheBuster::new(config.cache_bust),
            error_handler: ErrorHandler::new(),
            config,
        }
    }

    /// Fetch the results array with automatic retry
    pub async fn fetch_results(&self, feed: &dyn FeedSource) -> Result<Vec<Asset>, RetryFailure> {
        fetch_with_retry(&self.config, &self.cache_buster, &self.error_handler, |token| {
            feed.fetch_results(token)
        })
        .await
    }

    /// Fetch the last-update marker with automatic retry
    pub async fn fetch_last_update(
        &self,
        feed: &dyn FeedSource,
    ) -> Result<LastUpdate, RetryFailure> {
        fetch_with_retry(&self.config, &self.cache_buster, &self.error_handler, |token| {
            feed.fetch_last_update(token)
        })
        .await
    }

    /// Fetch the meta document with automatic retry
    pub async fn fetch_meta(&self, feed: &dyn FeedSource) -> Result<ScanMeta, RetryFailure> {
        fetch_with_retry(&self.config, &self.cache_buster, &self.error_handler, |token| {
            feed.fetch_meta(token)
        })
        .await
    }
}
