pub mod client;
pub mod error_handler;
pub mod retry;

pub use client::NetworkClient;
pub use retry::{CacheBustStrategy, RetryConfig, RetryFailure};
