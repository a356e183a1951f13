//! Error handling for the feed module

use thiserror::Error;

/// Longest slice of a response body kept in an HTTP error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum FeedError {
    /// Reqwest error, typically related to network issues or request failures.
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP error with status {status}: {message}")]
    Http { status: u16, message: String },

    /// The body could not be decoded into the expected shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The resource is not part of this source's feed layout.
    #[error("{0} is not published by this source")]
    NotPublished(&'static str),
}

/// Coarse failure categories surfaced to the dashboard.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display)]
pub enum FeedErrorKind {
    #[strum(to_string = "Network failure")]
    NetworkFailure,
    #[strum(to_string = "Parse failure")]
    ParseFailure,
}

impl FeedError {
    pub async fn from_response(response: reqwest::Response) -> FeedError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .map(|body| body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect())
            .unwrap_or_else(|_| "Failed to read response text".to_string());

        FeedError::Http { status, message }
    }

    pub fn kind(&self) -> FeedErrorKind {
        match self {
            FeedError::Reqwest(e) if e.is_decode() => FeedErrorKind::ParseFailure,
            FeedError::Reqwest(_) | FeedError::Http { .. } | FeedError::NotPublished(_) => {
                FeedErrorKind::NetworkFailure
            }
            FeedError::Parse(_) => FeedErrorKind::ParseFailure,
        }
    }
}
