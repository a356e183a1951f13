//! Scanner Feed Client
//!
//! Plain HTTP GETs against the static scanner output (or the scan API),
//! with a cache-buster query parameter on every request.

use crate::consts::cli_consts::feed_fetching;
use crate::environment::Environment;
use crate::feed::FeedSource;
use crate::feed::error::FeedError;
use crate::types::{Asset, LastUpdate, ScanMeta, parse_assets};
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;

// User-Agent string with CLI version
const USER_AGENT: &str = concat!("scanner-dashboard/", env!("CARGO_PKG_VERSION"));

/// Query parameter carrying the cache-buster.
const CACHE_BUSTER_PARAM: &str = "t";

#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    environment: Environment,
}

impl FeedClient {
    pub fn new(environment: Environment) -> Result<Self, FeedError> {
        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .timeout(feed_fetching::request_timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            environment,
        })
    }

    /// Append the cache-buster to `url`, respecting an existing query string.
    fn with_cache_buster(url: &str, cache_buster: Option<u64>) -> String {
        match cache_buster {
            Some(token) => {
                let separator = if url.contains('?') { '&' } else { '?' };
                format!("{}{}{}={}", url, separator, CACHE_BUSTER_PARAM, token)
            }
            None => url.to_string(),
        }
    }

    async fn handle_response_status(response: Response) -> Result<Response, FeedError> {
        if !response.status().is_success() {
            return Err(FeedError::from_response(response).await);
        }
        Ok(response)
    }

    async fn get_text(&self, url: &str, cache_buster: Option<u64>) -> Result<String, FeedError> {
        let url = Self::with_cache_buster(url, cache_buster);
        let response = self
            .client
            .get(&url)
            .header("Cache-Control", "no-cache")
            .send()
            .await?;

        let response = Self::handle_response_status(response).await?;
        Ok(response.text().await?)
    }
}

#[async_trait::async_trait]
impl FeedSource for FeedClient {
    fn has_last_update_feed(&self) -> bool {
        self.environment.last_update_url().is_some()
    }

    fn has_meta_feed(&self) -> bool {
        self.environment.meta_url().is_some()
    }

    async fn fetch_results(&self, cache_buster: Option<u64>) -> Result<Vec<Asset>, FeedError> {
        let body = self
            .get_text(&self.environment.results_url(), cache_buster)
            .await?;
        Ok(parse_assets(&body)?)
    }

    async fn fetch_last_update(&self, cache_buster: Option<u64>) -> Result<LastUpdate, FeedError> {
        let url = self
            .environment
            .last_update_url()
            .ok_or(FeedError::NotPublished("Last-update marker"))?;
        let body = self.get_text(&url, cache_buster).await?;
        Ok(LastUpdate::parse(&body))
    }

    async fn fetch_meta(&self, cache_buster: Option<u64>) -> Result<ScanMeta, FeedError> {
        let url = self
            .environment
            .meta_url()
            .ok_or(FeedError::NotPublished("Meta document"))?;
        let body = self.get_text(&url, cache_buster).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
