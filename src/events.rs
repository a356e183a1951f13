//! Event System
//!
//! Worker events for the activity log, and the messages workers send back to the UI loop

use crate::logging::{LogLevel, should_log_with_env};
use crate::network::RetryFailure;
use crate::types::{Asset, LastUpdate, ScanMeta};
use chrono::Local;
use std::fmt::Display;

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum Worker {
    /// Worker that fetches the feed resources for one load cycle.
    Loader,
    /// Ticker that decides whether the feed changed.
    PeriodicCheck,
    /// The dashboard itself (user actions, persisted state).
    Dashboard,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum EventType {
    Success,
    Error,
    Refresh,
    Waiting,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub worker: Worker,
    pub msg: String,
    pub timestamp: String,
    pub event_type: EventType,
    pub log_level: LogLevel,
}

impl Event {
    fn new(worker: Worker, msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self {
            worker,
            msg,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type,
            log_level,
        }
    }

    pub fn loader_with_level(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Worker::Loader, msg, event_type, log_level)
    }

    pub fn periodic_with_level(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Worker::PeriodicCheck, msg, event_type, log_level)
    }

    pub fn dashboard_with_level(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Worker::Dashboard, msg, event_type, log_level)
    }

    pub fn should_display(&self) -> bool {
        // Always show success events and info level events
        if self.event_type == EventType::Success || self.log_level >= LogLevel::Info {
            return true;
        }
        should_log_with_env(self.log_level)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.event_type, self.timestamp, self.msg)
    }
}

/// Why a load cycle was started. Decides how failures are surfaced.
#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum LoadMode {
    /// First load after startup.
    Initial,
    /// User pressed refresh (or retry).
    Manual,
    /// Background refresh from the periodic check. Failures are only logged.
    Silent,
}

impl LoadMode {
    pub fn is_silent(&self) -> bool {
        matches!(self, LoadMode::Silent)
    }
}

/// One resource of a load cycle, delivered as soon as its fetch settles.
#[derive(Debug)]
pub enum FetchedResource {
    Results(Result<Vec<Asset>, RetryFailure>),
    LastUpdate(Result<LastUpdate, RetryFailure>),
    Meta(Result<ScanMeta, RetryFailure>),
}

/// Everything background tasks tell the UI loop.
#[derive(Debug)]
pub enum WorkerMessage {
    Event(Event),
    Fetched {
        seq: u64,
        mode: LoadMode,
        resource: FetchedResource,
    },
    /// All resources of cycle `seq` have been delivered.
    CycleFinished { seq: u64 },
    /// Result of a periodic marker check started by the tick with `seq`.
    MarkerChecked {
        seq: u64,
        result: Result<LastUpdate, RetryFailure>,
    },
    /// The periodic interval elapsed.
    PeriodicTick,
}

impl From<Event> for WorkerMessage {
    fn from(event: Event) -> Self {
        WorkerMessage::Event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_info_always_display() {
        let success = Event::loader_with_level(
            "Loaded 3 assets".to_string(),
            EventType::Success,
            LogLevel::Debug,
        );
        assert!(success.should_display());

        let warn = Event::periodic_with_level(
            "Marker check failed".to_string(),
            EventType::Error,
            LogLevel::Warn,
        );
        assert!(warn.should_display());
    }

    #[test]
    fn test_display_format() {
        let event = Event::dashboard_with_level(
            "Added btc to watchlist".to_string(),
            EventType::Info,
            LogLevel::Info,
        );
        let text = event.to_string();
        assert!(text.starts_with("Info ["));
        assert!(text.ends_with("] Added btc to watchlist"));
        assert_eq!(event.worker, Worker::Dashboard);
    }
}
