pub mod cli_consts {
    //! Dashboard Configuration Constants
    //!
    //! This module contains all configuration constants for the dashboard,
    //! organized by functional area.

    // =============================================================================
    // QUEUE CONFIGURATION
    // =============================================================================

    /// The maximum number of events to keep in the activity logs.
    pub const MAX_ACTIVITY_LOGS: usize = 100;

    /// Buffer size of the channel carrying worker messages to the UI loop
    pub const EVENT_QUEUE_SIZE: usize = 100;

    // =============================================================================
    // STORAGE CONFIGURATION
    // =============================================================================

    /// Directory under the user's home holding config and persisted state
    pub const STATE_DIR_NAME: &str = ".scanner-dashboard";

    pub const CONFIG_FILE_NAME: &str = "config.json";

    pub const WATCHLIST_FILE_NAME: &str = "watchlist.json";

    pub const SNAPSHOT_CACHE_FILE_NAME: &str = "snapshot_cache.json";

    // =============================================================================
    // SCORE THRESHOLDS
    // =============================================================================

    /// Scores at or above this value are "high"
    pub const HIGH_SCORE_THRESHOLD: f64 = 7.0;

    /// Scores at or above this value (and below high) are "medium"
    pub const MEDIUM_SCORE_THRESHOLD: f64 = 4.0;

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    /// Feed fetching retry configuration
    pub mod feed_fetching {
        use std::time::Duration;

        /// Maximum number of attempts per resource before surfacing a failure
        pub const MAX_ATTEMPTS: u32 = 3;

        /// Linear backoff unit: attempt N waits N * BASE_DELAY_MS before retrying
        pub const BASE_DELAY_MS: u64 = 1000;

        /// Per-request timeout applied by the HTTP client
        pub const REQUEST_TIMEOUT_SECS: u64 = 15;

        pub const fn base_delay() -> Duration {
            Duration::from_millis(BASE_DELAY_MS)
        }

        pub const fn request_timeout() -> Duration {
            Duration::from_secs(REQUEST_TIMEOUT_SECS)
        }
    }

    /// Periodic check configuration
    pub mod refresh {
        use std::time::Duration;

        /// Interval between periodic checks (seconds)
        pub const CHECK_INTERVAL_SECS: u64 = 30;

        /// How long a toast notification stays on screen (milliseconds)
        pub const TOAST_DURATION_MS: u64 = 3000;

        pub const fn check_interval() -> Duration {
            Duration::from_secs(CHECK_INTERVAL_SECS)
        }

        pub const fn toast_duration() -> Duration {
            Duration::from_millis(TOAST_DURATION_MS)
        }
    }

    // =============================================================================
    // FEED LINKS
    // =============================================================================

    pub mod links {
        /// Shown when the feed provides no usable image URL
        pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/64";

        pub const COINGECKO_BASE_URL: &str = "https://www.coingecko.com";

        pub const TRADINGVIEW_CHART_URL: &str = "https://www.tradingview.com/chart/?symbol=";
    }
}
