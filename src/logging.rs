//! Log levels for dashboard events and the stderr backend for the `log` crate.

use log::{LevelFilter, Log, Metadata, Record};
use std::env;
use std::str::FromStr;

/// Severity attached to every dashboard event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(()),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

/// Threshold from `RUST_LOG`. Only the first directive counts, and a
/// `target=level` directive contributes its level. Anything unreadable means `Info`.
pub fn parse_rust_log_level(rust_log: &str) -> LogLevel {
    let first_directive = rust_log.split(',').next().unwrap_or_default();
    let level = first_directive
        .rsplit('=')
        .next()
        .unwrap_or(first_directive);
    level.parse().unwrap_or(LogLevel::Info)
}

pub fn get_rust_log_level() -> LogLevel {
    env::var("RUST_LOG")
        .map(|value| parse_rust_log_level(&value))
        .unwrap_or(LogLevel::Info)
}

/// Whether an event at `event_level` passes `threshold`.
pub fn should_log(event_level: LogLevel, threshold: LogLevel) -> bool {
    event_level >= threshold
}

pub fn should_log_with_env(event_level: LogLevel) -> bool {
    should_log(event_level, get_rust_log_level())
}

/// Backend for the `log` macros used outside the event system.
/// Writes to stderr, so it must never be installed while the TUI owns the terminal.
struct StderrLogger {
    threshold: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.threshold
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

/// Install the stderr backend at the `RUST_LOG` threshold (headless and one-shot modes).
pub fn init_stderr_logger() {
    let threshold: LevelFilter = get_rust_log_level().into();
    if log::set_boxed_logger(Box::new(StderrLogger { threshold })).is_ok() {
        log::set_max_level(threshold);
    }
}
