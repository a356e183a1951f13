use crate::feed::error::FeedError;
use crate::types::{Asset, LastUpdate, ScanMeta};

pub(crate) mod client;
pub use client::FeedClient;
pub mod error;

#[cfg(test)]
use mockall::automock;

/// A source of scanner output. Every fetch takes an optional cache-buster that the
/// implementation appends to the request so intermediate caches are bypassed.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Whether this source publishes a last-update marker next to the results.
    fn has_last_update_feed(&self) -> bool;

    /// Whether this source publishes the optional meta document.
    fn has_meta_feed(&self) -> bool;

    /// Fetch the results array.
    async fn fetch_results(&self, cache_buster: Option<u64>) -> Result<Vec<Asset>, FeedError>;

    /// Fetch the last-update marker.
    async fn fetch_last_update(&self, cache_buster: Option<u64>) -> Result<LastUpdate, FeedError>;

    /// Fetch the meta document.
    async fn fetch_meta(&self, cache_buster: Option<u64>) -> Result<ScanMeta, FeedError>;
}
