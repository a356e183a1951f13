//! Application configuration.

use crate::consts::cli_consts::{CONFIG_FILE_NAME, STATE_DIR_NAME, feed_fetching, refresh};
use crate::network::{CacheBustStrategy, RetryConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// What the periodic check does on each tick.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    /// Fetch the last-update marker and reload only when it changed.
    #[default]
    #[strum(to_string = "on-marker-change")]
    OnMarkerChange,
    /// Reload the results on every tick.
    #[strum(to_string = "always")]
    Always,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Overrides the `SCANNER_ENVIRONMENT` source when set.
    pub feed_base_url: Option<String>,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub check_interval_secs: u64,
    pub refresh_policy: RefreshPolicy,
    pub cache_bust: CacheBustStrategy,
    pub with_background_color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_base_url: None,
            max_attempts: feed_fetching::MAX_ATTEMPTS,
            base_delay_ms: feed_fetching::BASE_DELAY_MS,
            check_interval_secs: refresh::CHECK_INTERVAL_SECS,
            refresh_policy: RefreshPolicy::default(),
            cache_bust: CacheBustStrategy::default(),
            with_background_color: true,
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file at the given path.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let config: Config = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Loads the configuration at `path`, or the defaults if there is no file.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, std::io::Error> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a JSON file at the given path.
    ///
    /// Directories will be created if they don't exist. This method overwrites existing files.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if writing to file fails or serialization fails.
    #[allow(unused)]
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            cache_bust: self.cache_bust,
        }
    }

    /// Zero would spin the ticker; it is clamped to one second.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs.max(1))
    }
}

/// Directory holding the config, the watchlist and the snapshot cache.
pub fn get_state_dir() -> Result<PathBuf, std::io::Error> {
    let home = home::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine the home directory",
        )
    })?;
    Ok(home.join(STATE_DIR_NAME))
}

pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    Ok(get_state_dir()?.join(CONFIG_FILE_NAME))
}
