//! Centralized error handling and classification

use crate::feed::error::FeedError;
use crate::logging::LogLevel;

/// Centralized error handler for all feed requests
#[derive(Debug, Clone, Default)]
pub struct ErrorHandler;

impl ErrorHandler {
    pub fn new() -> Self {
        Self
    }

    /// Classify error and determine appropriate log level
    pub fn classify_error(&self, error: &FeedError) -> LogLevel {
        match error {
            // Rate limiting - low priority
            FeedError::Http { status, .. } if *status == 429 => LogLevel::Debug,

            // Server errors - temporary issues
            FeedError::Http { status, .. } if (500..=599).contains(status) => LogLevel::Warn,

            // Access errors - the feed will not recover on its own
            FeedError::Http { status, .. } if *status == 401 => LogLevel::Error,
            FeedError::Http { status, .. } if *status == 403 => LogLevel::Error,

            // Resources missing from the layout are expected for some sources
            FeedError::NotPublished(_) => LogLevel::Debug,

            // Network issues and half-written files - usually temporary
            FeedError::Reqwest(_) | FeedError::Parse(_) => LogLevel::Warn,

            // Other errors
            _ => LogLevel::Warn,
        }
    }

    /// Determine if an error should trigger retry logic
    pub fn should_retry(&self, error: &FeedError) -> bool {
        match error {
            // Retry on network/connection errors
            FeedError::Reqwest(_) => true,
            // A static file caught mid-upload parses fine a moment later
            FeedError::Parse(_) => true,
            FeedError::NotPublished(_) => false,

            // HTTP errors - check status code
            FeedError::Http { status, .. } => match *status {
                // Missing file during a deploy, timeouts and rate limits clear up
                404 | 408 | 429 => true,
                // Other client errors won't change between attempts
                400..=499 => false,
                // Retry server errors
                500..=599 => true,
                _ => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> FeedError {
        FeedError::Http {
            status,
            message: String::new(),
        }
    }

    #[test]
    fn test_retry_decisions() {
        let handler = ErrorHandler::new();
        assert!(handler.should_retry(&http(500)));
        assert!(handler.should_retry(&http(503)));
        assert!(handler.should_retry(&http(404)));
        assert!(handler.should_retry(&http(429)));
        assert!(!handler.should_retry(&http(403)));
        assert!(!handler.should_retry(&http(400)));
        assert!(!handler.should_retry(&FeedError::NotPublished("Meta document")));
        let parse = FeedError::from(serde_json::from_str::<u8>("x").unwrap_err());
        assert!(handler.should_retry(&parse));
    }

    #[test]
    fn test_classification() {
        let handler = ErrorHandler::new();
        assert_eq!(handler.classify_error(&http(429)), LogLevel::Debug);
        assert_eq!(handler.classify_error(&http(502)), LogLevel::Warn);
        assert_eq!(handler.classify_error(&http(401)), LogLevel::Error);
        assert_eq!(
            handler.classify_error(&FeedError::NotPublished("Meta document")),
            LogLevel::Debug
        );
    }
}
