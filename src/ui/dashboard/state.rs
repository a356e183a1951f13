//! Dashboard state management
//!
//! Contains the main dashboard state struct and related types

use crate::consts::cli_consts::{MAX_ACTIVITY_LOGS, refresh};
use crate::environment::Environment;
use crate::events::{Event as WorkerEvent, LoadMode};
use crate::feed::error::FeedErrorKind;
use crate::filter::{FilterState, TableView, select_rows};
use crate::storage::Watchlist;
use crate::types::{Asset, LastUpdate, ScanMeta, ScanSnapshot};

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// UI configuration data grouped by concern
#[derive(Debug, Clone)]
pub struct UIConfig {
    pub with_background_color: bool,
    /// Whether the source publishes a last-update marker.
    pub has_marker_feed: bool,
}

impl UIConfig {
    pub fn new(with_background_color: bool, has_marker_feed: bool) -> Self {
        Self {
            with_background_color,
            has_marker_feed,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Transient notification shown over the footer.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub expires_at: Instant,
}

/// The visible error state after an initial or manual load failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub kind: FeedErrorKind,
    pub message: String,
    pub attempts: u32,
}

/// How the results resource of a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Loaded { asset_count: usize },
    Failed { message: String },
    /// Results arrived after newer ones had been applied and were dropped.
    Discarded,
}

/// Where the last-update marker of the cycle in flight stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerSlot {
    Awaiting,
    Arrived(LastUpdate),
    /// Fetch failed, or the source does not publish one.
    Unavailable,
}

/// What handing one fetched resource to the state did to the visible snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Held until the rest of the cycle has settled.
    Staged,
    /// The cycle's snapshot replaced the visible one.
    Committed { asset_count: usize },
    /// Not for the cycle in flight, or older than the snapshot on screen.
    Stale,
}

/// The single load cycle allowed in flight. Fetched resources wait here until
/// the results and the marker can be committed together.
#[derive(Debug, Clone)]
pub struct InFlight {
    pub seq: u64,
    pub mode: LoadMode,
    pub started_at: Instant,
    pub outcome: Option<CycleOutcome>,
    pub(super) staged_results: Option<Vec<Asset>>,
    pub(super) marker: MarkerSlot,
}

/// Returned exactly once per cycle, when its in-flight slot is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedCycle {
    pub seq: u64,
    pub mode: LoadMode,
    pub outcome: Option<CycleOutcome>,
    pub elapsed: Duration,
}

/// Dashboard state: the one copy of everything the renderer shows.
#[derive(Debug)]
pub struct DashboardState {
    /// The feed source being displayed.
    pub environment: Environment,
    /// The start time of the application, used for computing uptime.
    pub start_time: Instant,
    /// Whether to enable background colors
    pub with_background_color: bool,
    pub has_marker_feed: bool,

    /// Latest successfully applied snapshot. Replaced wholesale.
    pub snapshot: Option<ScanSnapshot>,
    /// Marker committed together with the snapshot; what the periodic check compares against.
    pub last_update: Option<LastUpdate>,
    pub meta: Option<ScanMeta>,
    pub filter: FilterState,
    pub watchlist: Watchlist,
    /// Index into the currently visible rows.
    pub selected: usize,
    /// Asset id shown in the details popup.
    pub details: Option<String>,
    pub load_error: Option<LoadError>,
    pub toast: Option<Toast>,

    /// Queue of events waiting to be processed
    pub pending_events: VecDeque<WorkerEvent>,
    /// Activity logs for display
    pub activity_logs: VecDeque<WorkerEvent>,
    /// Animation tick counter
    pub tick: usize,

    pub(super) in_flight: Option<InFlight>,
    pub(super) marker_check: Option<u64>,
    pub(super) next_seq: u64,
    pub(super) applied_results_seq: u64,
}

impl DashboardState {
    /// Creates a new instance of the dashboard state.
    pub fn new(
        environment: Environment,
        start_time: Instant,
        watchlist: Watchlist,
        ui_config: UIConfig,
    ) -> Self {
        Self {
            environment,
            start_time,
            with_background_color: ui_config.with_background_color,
            has_marker_feed: ui_config.has_marker_feed,
            snapshot: None,
            last_update: None,
            meta: None,
            filter: FilterState::default(),
            watchlist,
            selected: 0,
            details: None,
            load_error: None,
            toast: None,
            pending_events: VecDeque::new(),
            activity_logs: VecDeque::new(),
            tick: 0,
            in_flight: None,
            marker_check: None,
            next_seq: 0,
            applied_results_seq: 0,
        }
    }

    /// Rows (or the empty state) for the current snapshot and filter.
    pub fn table_view(&self) -> TableView<'_> {
        select_rows(self.snapshot.as_ref(), self.filter)
    }

    pub fn selected_asset(&self) -> Option<&Asset> {
        self.table_view().rows().get(self.selected).copied()
    }

    /// The asset in the details popup, if it is still part of the snapshot.
    pub fn details_asset(&self) -> Option<&Asset> {
        let id = self.details.as_deref()?;
        self.snapshot.as_ref()?.find(id)
    }

    /// A load cycle is outstanding; refresh triggers are ignored.
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    pub fn marker_check_outstanding(&self) -> bool {
        self.marker_check.is_some()
    }

    /// Label of the refresh control.
    pub fn refresh_label(&self) -> &'static str {
        match self.in_flight.as_ref().map(|f| f.mode) {
            Some(LoadMode::Silent) => "Updating...",
            Some(_) => "Refreshing...",
            None if self.load_error.is_some() => "[R] Retry",
            None => "[R] Refresh",
        }
    }

    /// Label for the status panel: the snapshot's marker, falling back to the latest seen.
    pub fn last_updated_label(&self) -> String {
        self.snapshot
            .as_ref()
            .map(|snapshot| &snapshot.last_updated)
            .or(self.last_update.as_ref())
            .map(LastUpdate::label)
            .unwrap_or_else(|| LastUpdate::PLACEHOLDER.to_string())
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.toast = Some(Toast {
            message: message.into(),
            kind,
            expires_at: Instant::now() + refresh::toast_duration(),
        });
    }

    /// Add an event to activity logs with size limit
    pub fn add_to_activity_log(&mut self, event: WorkerEvent) {
        if self.activity_logs.len() >= MAX_ACTIVITY_LOGS {
            self.activity_logs.pop_front();
        }
        self.activity_logs.push_back(event);
    }

    /// Add an event to the processing queue
    pub fn add_event(&mut self, event: WorkerEvent) {
        self.pending_events.push_back(event);
    }
}
