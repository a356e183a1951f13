mod cli_messages;
mod config;
mod consts;
mod controller;
mod environment;
mod events;
mod feed;
mod filter;
mod logging;
mod network;
mod session;
mod storage;
mod types;
mod ui;
mod workers;

use crate::config::{Config, RefreshPolicy, get_config_path, get_state_dir};
use crate::environment::Environment;
use crate::filter::FilterState;
use crate::session::{
    SessionOptions, run_headless_mode, run_single_scan, run_tui_mode, setup_session,
};
use crate::storage::Storage;
use clap::{Args, Parser, Subcommand};
use std::error::Error;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line arguments
struct Cli {
    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

/// Feed and refresh settings. Each one overrides the config file.
#[derive(Args, Debug, Default)]
struct FeedArgs {
    /// Feed source: a base URL, `local` or `scan-api`
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Attempts per resource before a load is reported as failed
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Linear backoff unit between attempts, in milliseconds
    #[arg(long)]
    base_delay_ms: Option<u64>,

    /// Seconds between periodic checks
    #[arg(long)]
    check_interval_secs: Option<u64>,

    /// What each periodic check does
    #[arg(long, value_enum)]
    refresh_policy: Option<RefreshPolicy>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the dashboard
    Start {
        /// Print events and tables to the console instead of the TUI
        #[arg(long, default_value_t = false)]
        headless: bool,

        /// Initial table filter
        #[arg(long, value_enum, default_value_t = FilterState::All)]
        filter: FilterState,

        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Load the feed once and print the table
    Scan {
        #[arg(long, value_enum, default_value_t = FilterState::All)]
        filter: FilterState,

        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Show or edit the persisted watchlist
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },
    /// Delete the cached snapshot
    ClearCache,
}

#[derive(Subcommand)]
enum WatchlistAction {
    /// List watched asset ids
    List,
    /// Add an asset id, or remove it if already watched
    Toggle { asset_id: String },
}

/// Resolve the feed source: `SCANNER_ENVIRONMENT`, then the config file, then `--base-url`.
fn resolve_environment(config: &Config, base_url: Option<&str>) -> Result<Environment, String> {
    let mut environment = std::env::var("SCANNER_ENVIRONMENT")
        .ok()
        .and_then(|value| value.parse::<Environment>().ok())
        .unwrap_or_default();
    if let Some(url) = config.feed_base_url.as_deref() {
        environment = url
            .parse()
            .map_err(|_| format!("Invalid feed_base_url in config: {}", url))?;
    }
    if let Some(url) = base_url {
        environment = url
            .parse()
            .map_err(|_| format!("Invalid --base-url: {}", url))?;
    }
    Ok(environment)
}

fn apply_feed_args(mut config: Config, feed: &FeedArgs) -> Config {
    if let Some(max_attempts) = feed.max_attempts {
        config.max_attempts = max_attempts;
    }
    if let Some(base_delay_ms) = feed.base_delay_ms {
        config.base_delay_ms = base_delay_ms;
    }
    if let Some(check_interval_secs) = feed.check_interval_secs {
        config.check_interval_secs = check_interval_secs;
    }
    if let Some(refresh_policy) = feed.refresh_policy {
        config.refresh_policy = refresh_policy;
    }
    config
}

fn session_options(
    feed: &FeedArgs,
    filter: FilterState,
    periodic: bool,
) -> Result<SessionOptions, Box<dyn Error>> {
    let config = Config::load_or_default(&get_config_path()?)
        .map_err(|e| format!("Failed to load config: {}", e))?;
    let environment = resolve_environment(&config, feed.base_url.as_deref())?;
    Ok(SessionOptions {
        environment,
        config: apply_feed_args(config, feed),
        filter,
        state_dir: get_state_dir()?,
        periodic,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Start {
            headless,
            filter,
            feed,
        } => {
            let session = setup_session(session_options(&feed, filter, true)?)?;
            if headless {
                logging::init_stderr_logger();
                run_headless_mode(session).await
            } else {
                run_tui_mode(session).await
            }
        }
        Command::Scan { filter, feed } => {
            logging::init_stderr_logger();
            let session = setup_session(session_options(&feed, filter, false)?)?;
            run_single_scan(session).await
        }
        Command::Watchlist { action } => {
            let storage = Storage::new(get_state_dir()?);
            let mut watchlist = storage.load_watchlist();
            match action {
                WatchlistAction::List => {
                    if watchlist.is_empty() {
                        print_cmd_info!("Watchlist", "empty");
                    }
                    for asset_id in watchlist.iter() {
                        println!("{}", asset_id);
                    }
                }
                WatchlistAction::Toggle { asset_id } => {
                    let watched = watchlist.toggle(&asset_id);
                    storage
                        .save_watchlist(&watchlist)
                        .map_err(|e| format!("Failed to save watchlist: {}", e))?;
                    if watched {
                        print_cmd_success!("Watchlist", "added {}", asset_id);
                    } else {
                        print_cmd_success!("Watchlist", "removed {}", asset_id);
                    }
                }
            }
            Ok(())
        }
        Command::ClearCache => {
            let storage = Storage::new(get_state_dir()?);
            match storage.clear_cached_snapshot() {
                Ok(true) => print_cmd_success!("Cache", "snapshot cache cleared"),
                Ok(false) => print_cmd_info!("Cache", "no cached snapshot"),
                Err(e) => {
                    print_cmd_error!("Failed to clear cache", e.to_string().as_str());
                    return Err(e.into());
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_base_url_overrides_config() {
        let config = Config {
            feed_base_url: Some("https://feeds.example.com/data".to_string()),
            ..Config::default()
        };
        assert_eq!(
            resolve_environment(&config, None).unwrap(),
            Environment::Custom {
                base_url: "https://feeds.example.com/data".to_string()
            }
        );
        assert_eq!(
            resolve_environment(&config, Some("scan-api")).unwrap(),
            Environment::ScanApi
        );
        assert!(resolve_environment(&config, Some("ftp://nope")).is_err());
    }

    #[test]
    fn test_feed_args_override_config() {
        let feed = FeedArgs {
            max_attempts: Some(1),
            refresh_policy: Some(RefreshPolicy::Always),
            ..FeedArgs::default()
        };
        let config = apply_feed_args(Config::default(), &feed);
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.refresh_policy, RefreshPolicy::Always);
        assert_eq!(config.base_delay_ms, Config::default().base_delay_ms);
    }
}
