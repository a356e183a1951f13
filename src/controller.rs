//! Dashboard controller
//!
//! Owns the dashboard state and is the only code that mutates it. User actions
//! and worker messages both come through here; network work is handed to
//! spawned tasks via the `LoadDispatcher` and comes back as `WorkerMessage`s.

use crate::config::RefreshPolicy;
use crate::environment::Environment;
use crate::events::{Event, EventType, FetchedResource, LoadMode, WorkerMessage};
use crate::filter::FilterState;
use crate::logging::LogLevel;
use crate::network::RetryFailure;
use crate::network::error_handler::ErrorHandler;
use crate::storage::{Storage, StorageError};
use crate::types::LastUpdate;
use crate::ui::dashboard::state::ToastKind;
use crate::ui::dashboard::{Applied, CycleOutcome, DashboardState, FinishedCycle, UIConfig};
use crate::workers::loader::{LoadDispatcher, LoadRequest};
use std::time::Instant;

/// Display and refresh settings for one session.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub environment: Environment,
    pub refresh_policy: RefreshPolicy,
    pub with_background_color: bool,
    pub initial_filter: FilterState,
}

pub struct DashboardController {
    state: DashboardState,
    dispatcher: LoadDispatcher,
    storage: Storage,
    refresh_policy: RefreshPolicy,
    error_handler: ErrorHandler,
}

impl DashboardController {
    pub fn new(dispatcher: LoadDispatcher, storage: Storage, settings: ControllerSettings) -> Self {
        let has_marker_feed = dispatcher.has_last_update_feed();
        // Without a marker there is nothing to compare, so every tick reloads
        let refresh_policy = if has_marker_feed {
            settings.refresh_policy
        } else {
            RefreshPolicy::Always
        };
        let mut state = DashboardState::new(
            settings.environment,
            Instant::now(),
            storage.load_watchlist(),
            UIConfig::new(settings.with_background_color, has_marker_feed),
        );
        state.filter = settings.initial_filter;

        Self {
            state,
            dispatcher,
            storage,
            refresh_policy,
            error_handler: ErrorHandler::new(),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DashboardState {
        &mut self.state
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.refresh_policy
    }

    fn log(&mut self, msg: String, event_type: EventType, log_level: LogLevel) {
        self.state
            .add_event(Event::dashboard_with_level(msg, event_type, log_level));
    }

    fn log_loader(&mut self, msg: String, event_type: EventType, log_level: LogLevel) {
        self.state
            .add_event(Event::loader_with_level(msg, event_type, log_level));
    }

    // =========================================================================
    // LOADING
    // =========================================================================

    fn start_load(&mut self, mode: LoadMode) -> Option<u64> {
        let seq = self.state.begin_load(mode)?;
        self.dispatcher.spawn_load(LoadRequest { seq, mode });
        Some(seq)
    }

    /// First load after startup.
    pub fn initialize(&mut self) -> Option<u64> {
        self.start_load(LoadMode::Initial)
    }

    /// Start a refresh. Ignored (returns `None`) while another load is in flight.
    pub fn refresh(&mut self, manual: bool) -> Option<u64> {
        let mode = if manual {
            LoadMode::Manual
        } else {
            LoadMode::Silent
        };
        let started = self.start_load(mode);
        if started.is_none() && manual {
            self.log(
                "Refresh already in progress".to_string(),
                EventType::Waiting,
                LogLevel::Debug,
            );
        }
        started
    }

    /// One periodic tick. Skipped when a load or a marker check is outstanding.
    pub fn periodic_check(&mut self) {
        match self.refresh_policy {
            RefreshPolicy::Always => {
                self.refresh(false);
            }
            RefreshPolicy::OnMarkerChange => {
                if let Some(seq) = self.state.begin_marker_check() {
                    self.dispatcher.spawn_marker_check(seq);
                }
            }
        }
    }

    /// Apply one worker message. Returns the cycle that just finished, if any.
    pub fn handle(&mut self, message: WorkerMessage) -> Option<FinishedCycle> {
        match message {
            WorkerMessage::Event(event) => self.state.add_event(event),
            WorkerMessage::PeriodicTick => self.periodic_check(),
            WorkerMessage::MarkerChecked { seq, result } => self.on_marker_checked(seq, result),
            WorkerMessage::Fetched {
                seq,
                mode,
                resource,
            } => self.on_fetched(seq, mode, resource),
            WorkerMessage::CycleFinished { seq } => return self.on_cycle_finished(seq),
        }
        None
    }

    fn on_marker_checked(&mut self, seq: u64, result: Result<LastUpdate, RetryFailure>) {
        match result {
            Ok(marker) => match self.state.finish_marker_check(seq, Some(&marker)) {
                Some(true) => {
                    self.log(
                        format!("New scan published ({}), refreshing", marker.label()),
                        EventType::Refresh,
                        LogLevel::Info,
                    );
                    self.refresh(false);
                }
                Some(false) => self.log(
                    "No new scan since last load".to_string(),
                    EventType::Waiting,
                    LogLevel::Debug,
                ),
                None => {}
            },
            Err(failure) => {
                self.state.finish_marker_check(seq, None);
                let level = self.error_handler.classify_error(&failure.error);
                self.log(
                    format!("Periodic check failed: {}", failure),
                    EventType::Error,
                    level,
                );
            }
        }
    }

    fn on_fetched(&mut self, seq: u64, mode: LoadMode, resource: FetchedResource) {
        match resource {
            FetchedResource::Results(Ok(assets)) => {
                let applied = self.state.stage_results(seq, assets);
                self.log_applied(seq, mode, applied);
            }
            FetchedResource::Results(Err(failure)) => self.on_results_failed(seq, mode, failure),
            FetchedResource::LastUpdate(Ok(marker)) => {
                if marker.parsed.is_none() && !marker.raw.is_empty() {
                    self.log_loader(
                        format!("Unrecognized last-update marker: {:?}", marker.raw),
                        EventType::Info,
                        LogLevel::Debug,
                    );
                }
                let applied = self.state.stage_last_update(seq, marker);
                self.log_applied(seq, mode, applied);
            }
            FetchedResource::LastUpdate(Err(failure)) => {
                let level = self.error_handler.classify_error(&failure.error);
                self.log_loader(
                    format!("Could not fetch last-update marker: {}", failure),
                    EventType::Error,
                    level.min(LogLevel::Warn),
                );
                let applied = self.state.last_update_failed(seq);
                self.log_applied(seq, mode, applied);
            }
            FetchedResource::Meta(Ok(meta)) => self.state.apply_meta(seq, meta),
            FetchedResource::Meta(Err(failure)) => self.log_loader(
                format!("Could not fetch scan meta: {}", failure),
                EventType::Error,
                LogLevel::Debug,
            ),
        }
    }

    fn log_applied(&mut self, seq: u64, mode: LoadMode, applied: Applied) {
        match applied {
            Applied::Staged => {}
            Applied::Committed { asset_count } => {
                let level = if mode.is_silent() {
                    LogLevel::Debug
                } else {
                    LogLevel::Info
                };
                self.log_loader(
                    format!("Loaded {} assets", asset_count),
                    EventType::Success,
                    level,
                );
            }
            Applied::Stale => self.log_loader(
                format!("Discarded stale results from load #{}", seq),
                EventType::Info,
                LogLevel::Debug,
            ),
        }
    }

    fn on_results_failed(&mut self, seq: u64, mode: LoadMode, failure: RetryFailure) {
        self.state.record_results_failure(seq, mode, &failure);

        if mode.is_silent() {
            // Background failures keep the current view and are only logged
            let level = self.error_handler.classify_error(&failure.error);
            self.log_loader(
                format!("Background refresh failed: {}", failure),
                EventType::Error,
                level,
            );
            return;
        }

        self.log_loader(
            format!("{}: {}", failure.error.kind(), failure),
            EventType::Error,
            LogLevel::Error,
        );

        if self.state.snapshot.is_none() {
            if let Some(cached) = self.storage.load_cached_snapshot() {
                let fetched_at = cached.fetched_at;
                if self.state.restore_cached(cached) {
                    self.log(
                        format!(
                            "Showing cached snapshot from {}",
                            fetched_at
                                .with_timezone(&chrono::Local)
                                .format("%Y-%m-%d %H:%M:%S")
                        ),
                        EventType::Info,
                        LogLevel::Warn,
                    );
                }
            }
        }
    }

    fn on_cycle_finished(&mut self, seq: u64) -> Option<FinishedCycle> {
        let finished = self.state.finish_cycle(seq)?;
        self.log(
            format!(
                "{} load #{} finished in {} ms",
                finished.mode,
                finished.seq,
                finished.elapsed.as_millis()
            ),
            EventType::Info,
            LogLevel::Debug,
        );

        if let Some(CycleOutcome::Loaded { .. }) = finished.outcome {
            self.persist_snapshot();
        }

        if finished.mode == LoadMode::Manual {
            match &finished.outcome {
                Some(CycleOutcome::Loaded { asset_count }) => self
                    .state
                    .show_toast(format!("Refreshed: {} assets", asset_count), ToastKind::Success),
                Some(CycleOutcome::Failed { .. }) => self
                    .state
                    .show_toast("Refresh failed", ToastKind::Error),
                _ => {}
            }
        }
        Some(finished)
    }

    fn persist_snapshot(&mut self) {
        let Some(snapshot) = self.state.snapshot.as_ref() else {
            return;
        };
        if let Err(e) = self.storage.save_snapshot(snapshot) {
            log::warn!("Failed to cache snapshot: {}", e);
            self.log(
                format!("Failed to cache snapshot: {}", e),
                EventType::Error,
                LogLevel::Warn,
            );
        }
    }

    // =========================================================================
    // USER ACTIONS
    // =========================================================================

    pub fn set_filter(&mut self, filter: FilterState) {
        if self.state.filter != filter {
            self.state.filter = filter;
            self.state.selected = 0;
        }
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.state.filter.cycle());
    }

    pub fn select_next(&mut self) {
        self.state.select_next();
    }

    pub fn select_previous(&mut self) {
        self.state.select_previous();
    }

    pub fn selected_asset_id(&self) -> Option<String> {
        self.state.selected_asset().map(|asset| asset.id.clone())
    }

    /// Open the details view. An id no longer in the snapshot is ignored.
    pub fn show_details(&mut self, asset_id: &str) -> bool {
        let exists = self
            .state
            .snapshot
            .as_ref()
            .is_some_and(|snapshot| snapshot.find(asset_id).is_some());
        if exists {
            self.state.details = Some(asset_id.to_string());
        }
        exists
    }

    pub fn close_details(&mut self) -> bool {
        self.state.details.take().is_some()
    }

    /// Add or remove `asset_id` and persist the watchlist right away.
    /// Returns whether the asset is now watched.
    pub fn toggle_watchlist(&mut self, asset_id: &str) -> Result<bool, StorageError> {
        let watched = self.state.watchlist.toggle(asset_id);
        let verb = if watched { "Added" } else { "Removed" };
        match self.storage.save_watchlist(&self.state.watchlist) {
            Ok(()) => {
                self.log(
                    format!("{} {} {} watchlist", verb, asset_id, if watched { "to" } else { "from" }),
                    EventType::Info,
                    LogLevel::Info,
                );
                Ok(watched)
            }
            Err(e) => {
                self.log(
                    format!("Failed to save watchlist: {}", e),
                    EventType::Error,
                    LogLevel::Error,
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MockFeedSource;
    use crate::feed::error::FeedError;
    use crate::filter::TableView;
    use crate::network::{CacheBustStrategy, NetworkClient, RetryConfig};
    use crate::types::{Asset, ScanSnapshot};
    use crate::workers::core::EventSender;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    struct Harness {
        controller: DashboardController,
        receiver: mpsc::Receiver<WorkerMessage>,
        dir: TempDir,
    }

    impl Harness {
        fn new(feed: MockFeedSource) -> Self {
            Self::with_dir(feed, tempdir().unwrap())
        }

        fn with_dir(feed: MockFeedSource, dir: TempDir) -> Self {
            let (sender, receiver) = mpsc::channel(64);
            let network = NetworkClient::new(RetryConfig {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
                cache_bust: CacheBustStrategy::Counter,
            });
            let dispatcher =
                LoadDispatcher::new(Arc::new(feed), Arc::new(network), EventSender::new(sender));
            let settings = ControllerSettings {
                environment: Environment::Local,
                refresh_policy: RefreshPolicy::OnMarkerChange,
                with_background_color: false,
                initial_filter: FilterState::All,
            };
            let controller = DashboardController::new(dispatcher, Storage::new(dir.path()), settings);
            Self {
                controller,
                receiver,
                dir,
            }
        }

        async fn next_message(&mut self) -> WorkerMessage {
            timeout(Duration::from_secs(5), self.receiver.recv())
                .await
                .expect("timed out waiting for a worker message")
                .expect("channel closed")
        }

        /// Handle messages until a load cycle finishes.
        async fn run_cycle(&mut self) -> FinishedCycle {
            loop {
                let message = self.next_message().await;
                if let Some(finished) = self.controller.handle(message) {
                    return finished;
                }
            }
        }

        /// Handle messages until the pending marker check has been answered.
        async fn run_marker_check(&mut self) {
            loop {
                let message = self.next_message().await;
                let is_marker = matches!(message, WorkerMessage::MarkerChecked { .. });
                self.controller.handle(message);
                if is_marker {
                    return;
                }
            }
        }
    }

    fn feed_with_marker() -> MockFeedSource {
        let mut feed = MockFeedSource::new();
        feed.expect_has_last_update_feed().return_const(true);
        feed.expect_has_meta_feed().return_const(false);
        feed
    }

    fn scored(ids: &[(&str, f64)]) -> Vec<Asset> {
        ids.iter()
            .map(|(id, score)| Asset::new(*id).with_score(*score))
            .collect()
    }

    fn unavailable() -> FeedError {
        FeedError::Http {
            status: 503,
            message: "unavailable".to_string(),
        }
    }

    #[tokio::test]
    async fn test_initial_load_applies_results_and_caches_them() {
        let mut feed = feed_with_marker();
        feed.expect_fetch_results()
            .times(1)
            .returning(|_| Ok(scored(&[("btc", 8.0), ("eth", 5.0), ("doge", 2.0)])));
        feed.expect_fetch_last_update()
            .times(1)
            .returning(|_| Ok(LastUpdate::parse("2024-05-01T12:30:00Z")));

        let mut harness = Harness::new(feed);
        assert!(harness.controller.initialize().is_some());
        let finished = harness.run_cycle().await;

        assert_eq!(
            finished.outcome,
            Some(CycleOutcome::Loaded { asset_count: 3 })
        );
        let state = harness.controller.state();
        assert!(!state.is_refreshing());
        assert_eq!(
            state.snapshot.as_ref().unwrap().last_updated,
            LastUpdate::parse("2024-05-01T12:30:00Z")
        );

        harness.controller.set_filter(FilterState::High);
        let ids: Vec<&str> = harness
            .controller
            .state()
            .table_view()
            .rows()
            .iter()
            .map(|asset| asset.id.as_str())
            .collect();
        assert_eq!(ids, vec!["btc"]);

        let cached = Storage::new(harness.dir.path()).load_cached_snapshot().unwrap();
        assert_eq!(cached.assets.len(), 3);
    }

    #[tokio::test]
    // A refresh triggered while one is outstanding never reaches the network.
    async fn test_overlapping_refresh_is_ignored() {
        let mut feed = feed_with_marker();
        feed.expect_fetch_results()
            .times(1)
            .returning(|_| Ok(scored(&[("btc", 8.0)])));
        feed.expect_fetch_last_update()
            .times(1)
            .returning(|_| Ok(LastUpdate::parse("2024-05-01T12:30:00Z")));

        let mut harness = Harness::new(feed);
        let first = harness.controller.refresh(true);
        assert!(first.is_some());
        assert_eq!(harness.controller.refresh(true), None);
        assert_eq!(harness.controller.state().refresh_label(), "Refreshing...");

        let finished = harness.run_cycle().await;
        assert_eq!(Some(finished.seq), first);
        assert!(!harness.controller.state().is_refreshing());
        assert_eq!(harness.controller.state().refresh_label(), "[R] Refresh");
        assert_eq!(
            harness.controller.state().toast.as_ref().map(|t| t.kind),
            Some(ToastKind::Success)
        );
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut feed = feed_with_marker();
        feed.expect_fetch_results().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(scored(&[("btc", 8.0), ("eth", 5.0)]))
            } else {
                Err(unavailable())
            }
        });
        feed.expect_fetch_last_update()
            .returning(|_| Ok(LastUpdate::parse("2024-05-01T12:30:00Z")));

        let mut harness = Harness::new(feed);
        harness.controller.initialize();
        harness.run_cycle().await;
        let before = harness.controller.state().snapshot.clone();

        harness.controller.refresh(true);
        let finished = harness.run_cycle().await;

        // One successful call plus two attempts of the failed refresh
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(finished.outcome, Some(CycleOutcome::Failed { .. })));
        let state = harness.controller.state();
        assert_eq!(state.snapshot, before);
        assert_eq!(state.load_error.as_ref().unwrap().attempts, 2);
        assert_eq!(state.refresh_label(), "[R] Retry");
        assert_eq!(state.toast.as_ref().map(|t| t.kind), Some(ToastKind::Error));
    }

    #[tokio::test]
    // Results render even when the last-update marker is not a timestamp.
    async fn test_unparseable_marker_does_not_block_results() {
        let mut feed = feed_with_marker();
        feed.expect_fetch_results()
            .returning(|_| Ok(scored(&[("btc", 8.0), ("eth", 5.0)])));
        feed.expect_fetch_last_update()
            .returning(|_| Ok(LastUpdate::parse("N/A")));

        let mut harness = Harness::new(feed);
        harness.controller.initialize();
        harness.run_cycle().await;

        let state = harness.controller.state();
        assert_eq!(state.last_updated_label(), LastUpdate::PLACEHOLDER);
        assert_eq!(state.table_view().rows().len(), 2);
        assert!(state.load_error.is_none());
    }

    #[tokio::test]
    async fn test_initial_failure_falls_back_to_cache() {
        let dir = tempdir().unwrap();
        let cached = ScanSnapshot::new(scored(&[("sol", 7.5)]), LastUpdate::unknown());
        Storage::new(dir.path()).save_snapshot(&cached).unwrap();

        let mut feed = feed_with_marker();
        feed.expect_fetch_results().returning(|_| Err(unavailable()));
        feed.expect_fetch_last_update().returning(|_| Err(unavailable()));

        let mut harness = Harness::with_dir(feed, dir);
        harness.controller.initialize();
        harness.run_cycle().await;

        let state = harness.controller.state();
        let snapshot = state.snapshot.as_ref().unwrap();
        assert!(snapshot.from_cache);
        assert_eq!(snapshot.assets[0].id, "sol");
        assert!(state.load_error.is_some());
    }

    #[tokio::test]
    async fn test_initial_failure_without_cache_shows_error_state() {
        let mut feed = feed_with_marker();
        feed.expect_fetch_results().returning(|_| {
            Err(FeedError::from(
                serde_json::from_str::<Vec<u8>>("{").unwrap_err(),
            ))
        });
        feed.expect_fetch_last_update()
            .returning(|_| Ok(LastUpdate::unknown()));

        let mut harness = Harness::new(feed);
        harness.controller.initialize();
        harness.run_cycle().await;

        let state = harness.controller.state();
        assert_eq!(state.table_view(), TableView::NoData);
        assert_eq!(
            state.load_error.as_ref().map(|e| e.kind),
            Some(crate::feed::error::FeedErrorKind::ParseFailure)
        );
    }

    #[tokio::test]
    async fn test_periodic_check_reloads_only_on_marker_change() {
        let marker_calls = Arc::new(AtomicUsize::new(0));
        let counter = marker_calls.clone();
        let mut feed = feed_with_marker();
        feed.expect_fetch_results()
            .times(2)
            .returning(|_| Ok(scored(&[("btc", 8.0)])));
        // initial load, unchanged check, changed check, reload
        feed.expect_fetch_last_update().returning(move |_| {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Ok(LastUpdate::parse("2024-05-01T12:00:00Z")),
                _ => Ok(LastUpdate::parse("2024-05-01T12:30:00Z")),
            }
        });

        let mut harness = Harness::new(feed);
        harness.controller.initialize();
        harness.run_cycle().await;

        harness.controller.handle(WorkerMessage::PeriodicTick);
        assert!(harness.controller.state().marker_check_outstanding());
        // A second tick while the check is outstanding is skipped
        harness.controller.handle(WorkerMessage::PeriodicTick);
        harness.run_marker_check().await;
        assert!(!harness.controller.state().is_refreshing());

        harness.controller.handle(WorkerMessage::PeriodicTick);
        harness.run_marker_check().await;
        assert_eq!(
            harness.controller.state().in_flight().map(|f| f.mode),
            Some(LoadMode::Silent)
        );
        let finished = harness.run_cycle().await;
        assert_eq!(finished.mode, LoadMode::Silent);
        assert_eq!(marker_calls.load(Ordering::SeqCst), 4);
        assert_eq!(
            harness.controller.state().last_updated_label(),
            LastUpdate::parse("2024-05-01T12:30:00Z").label()
        );
    }

    #[tokio::test]
    // Every state the UI can draw pairs results with the marker of the same cycle.
    async fn test_results_and_marker_of_one_cycle_appear_together() {
        let calls = Arc::new(AtomicUsize::new(0));
        let results_counter = calls.clone();
        let marker_counter = Arc::new(AtomicUsize::new(0));
        let mut feed = feed_with_marker();
        feed.expect_fetch_results().returning(move |_| {
            if results_counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(scored(&[("btc", 8.0)]))
            } else {
                Ok(scored(&[("eth", 5.0)]))
            }
        });
        feed.expect_fetch_last_update().returning(move |_| {
            if marker_counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(LastUpdate::parse("2024-05-01T12:00:00Z"))
            } else {
                Ok(LastUpdate::parse("2024-05-01T12:30:00Z"))
            }
        });

        let shown = |controller: &DashboardController| {
            controller.state().snapshot.as_ref().map(|snapshot| {
                (
                    snapshot.assets[0].id.clone(),
                    snapshot.last_updated.raw.clone(),
                )
            })
        };
        let first = Some(("btc".to_string(), "2024-05-01T12:00:00Z".to_string()));
        let second = Some(("eth".to_string(), "2024-05-01T12:30:00Z".to_string()));

        let mut harness = Harness::new(feed);
        harness.controller.initialize();
        harness.run_cycle().await;
        assert_eq!(shown(&harness.controller), first);

        harness.controller.refresh(true);
        loop {
            let message = harness.next_message().await;
            let finished = harness.controller.handle(message);
            let current = shown(&harness.controller);
            assert!(current == first || current == second, "mixed state {:?}", current);
            if finished.is_some() {
                break;
            }
        }
        assert_eq!(shown(&harness.controller), second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    // A marker fetched alongside failed results must not suppress the next reload.
    async fn test_periodic_check_recovers_after_failed_results() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut feed = feed_with_marker();
        feed.expect_fetch_results().returning(move |_| {
            // Both attempts of the initial load fail
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(unavailable())
            } else {
                Ok(scored(&[("btc", 8.0)]))
            }
        });
        feed.expect_fetch_last_update()
            .returning(|_| Ok(LastUpdate::parse("2024-05-01T12:00:00Z")));

        let mut harness = Harness::new(feed);
        harness.controller.initialize();
        let finished = harness.run_cycle().await;
        assert!(matches!(finished.outcome, Some(CycleOutcome::Failed { .. })));
        assert!(harness.controller.state().snapshot.is_none());

        harness.controller.handle(WorkerMessage::PeriodicTick);
        harness.run_marker_check().await;
        assert_eq!(
            harness.controller.state().in_flight().map(|f| f.mode),
            Some(LoadMode::Silent)
        );
        let finished = harness.run_cycle().await;

        assert_eq!(
            finished.outcome,
            Some(CycleOutcome::Loaded { asset_count: 1 })
        );
        let state = harness.controller.state();
        assert!(state.load_error.is_none());
        assert_eq!(state.snapshot.as_ref().unwrap().assets[0].id, "btc");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_silent_failure_is_only_logged() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut feed = MockFeedSource::new();
        feed.expect_has_last_update_feed().return_const(false);
        feed.expect_has_meta_feed().return_const(false);
        feed.expect_fetch_results().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(scored(&[("btc", 8.0)]))
            } else {
                Err(unavailable())
            }
        });

        let mut harness = Harness::new(feed);
        assert_eq!(harness.controller.refresh_policy(), RefreshPolicy::Always);
        harness.controller.initialize();
        harness.run_cycle().await;

        harness.controller.handle(WorkerMessage::PeriodicTick);
        let finished = harness.run_cycle().await;

        assert_eq!(finished.mode, LoadMode::Silent);
        let state = harness.controller.state();
        assert!(state.load_error.is_none());
        assert!(state.toast.is_none());
        assert_eq!(state.snapshot.as_ref().unwrap().assets.len(), 1);
        assert!(state.pending_events.iter().any(|e| e.msg.contains("Background refresh failed")));
    }

    #[tokio::test]
    async fn test_details_for_unknown_asset_is_a_no_op() {
        let mut feed = feed_with_marker();
        feed.expect_fetch_results()
            .returning(|_| Ok(scored(&[("btc", 8.0)])));
        feed.expect_fetch_last_update()
            .returning(|_| Ok(LastUpdate::unknown()));

        let mut harness = Harness::new(feed);
        assert!(!harness.controller.show_details("btc"));
        harness.controller.initialize();
        harness.run_cycle().await;

        assert!(!harness.controller.show_details("delisted"));
        assert!(harness.controller.state().details.is_none());
        assert!(harness.controller.show_details("btc"));
        assert_eq!(
            harness.controller.state().details_asset().map(|a| a.id.as_str()),
            Some("btc")
        );
        assert!(harness.controller.close_details());
    }

    #[tokio::test]
    async fn test_watchlist_toggle_persists_immediately() {
        let mut harness = Harness::new(feed_with_marker());

        assert!(harness.controller.toggle_watchlist("btc").unwrap());
        let stored = Storage::new(harness.dir.path()).load_watchlist();
        assert!(stored.contains("btc"));

        assert!(!harness.controller.toggle_watchlist("btc").unwrap());
        assert!(Storage::new(harness.dir.path()).load_watchlist().is_empty());
    }
}
