//! Dashboard state update logic
//!
//! Every mutation of the dashboard goes through these methods, called from the
//! UI loop only. Load results carry the sequence number of their cycle; results
//! older than what is already applied are dropped.

use super::state::{
    Applied, CycleOutcome, DashboardState, FinishedCycle, InFlight, LoadError, MarkerSlot,
};

use crate::events::{Event as WorkerEvent, LoadMode};
use crate::network::RetryFailure;
use crate::types::{Asset, LastUpdate, ScanMeta, ScanSnapshot};

use chrono::Utc;
use std::time::Instant;

impl DashboardState {
    /// Update the dashboard state with a new tick.
    pub fn update(&mut self) {
        self.tick += 1;

        // Process all queued events one by one
        self.take_pending_events();

        if self
            .toast
            .as_ref()
            .is_some_and(|toast| Instant::now() >= toast.expires_at)
        {
            self.toast = None;
        }

        self.clamp_selection();
        if self.details.is_some() && self.details_asset().is_none() {
            self.details = None;
        }
    }

    /// Move queued events to the activity log, returning them for printing.
    pub fn take_pending_events(&mut self) -> Vec<WorkerEvent> {
        let events: Vec<WorkerEvent> = self.pending_events.drain(..).collect();
        for event in &events {
            self.add_to_activity_log(event.clone());
        }
        events
    }

    // =========================================================================
    // LOAD CYCLES
    // =========================================================================

    /// Claim the in-flight slot. `None` while another cycle is outstanding.
    pub fn begin_load(&mut self, mode: LoadMode) -> Option<u64> {
        if self.in_flight.is_some() {
            return None;
        }
        let seq = self.allocate_seq();
        let marker = if self.has_marker_feed {
            MarkerSlot::Awaiting
        } else {
            MarkerSlot::Unavailable
        };
        self.in_flight = Some(InFlight {
            seq,
            mode,
            started_at: Instant::now(),
            outcome: None,
            staged_results: None,
            marker,
        });
        Some(seq)
    }

    /// Claim the marker-check slot. `None` if a load or another check is outstanding.
    pub fn begin_marker_check(&mut self) -> Option<u64> {
        if self.in_flight.is_some() || self.marker_check.is_some() {
            return None;
        }
        let seq = self.allocate_seq();
        self.marker_check = Some(seq);
        Some(seq)
    }

    /// Release the marker-check slot. Returns whether a reload is due, or `None`
    /// for an unknown check. A reload is due when the marker differs from the
    /// committed one, or when nothing good is on screen yet.
    pub fn finish_marker_check(&mut self, seq: u64, marker: Option<&LastUpdate>) -> Option<bool> {
        if self.marker_check != Some(seq) {
            return None;
        }
        self.marker_check = None;
        let marker = marker?;
        let needs_recovery = self.snapshot.is_none() || self.load_error.is_some();
        Some(
            needs_recovery
                || self
                    .last_update
                    .as_ref()
                    .is_none_or(|seen| seen.raw != marker.raw),
        )
    }

    /// Hold the results of the cycle in flight; they are committed once its marker settles.
    pub fn stage_results(&mut self, seq: u64, assets: Vec<Asset>) -> Applied {
        let Some(in_flight) = self.in_flight_mut(seq) else {
            return Applied::Stale;
        };
        in_flight.staged_results = Some(assets);
        self.try_commit(seq)
    }

    /// Hold the marker of the cycle in flight.
    pub fn stage_last_update(&mut self, seq: u64, marker: LastUpdate) -> Applied {
        let Some(in_flight) = self.in_flight_mut(seq) else {
            return Applied::Stale;
        };
        in_flight.marker = MarkerSlot::Arrived(marker);
        self.try_commit(seq)
    }

    /// The marker fetch failed. Staged results are committed without it.
    pub fn last_update_failed(&mut self, seq: u64) -> Applied {
        let Some(in_flight) = self.in_flight_mut(seq) else {
            return Applied::Stale;
        };
        in_flight.marker = MarkerSlot::Unavailable;
        self.try_commit(seq)
    }

    /// Replace the snapshot with `assets` and their marker in one assignment.
    /// A `None` marker shows the placeholder, or the arrival time for sources
    /// that publish no marker.
    pub fn commit_snapshot(
        &mut self,
        seq: u64,
        assets: Vec<Asset>,
        marker: Option<LastUpdate>,
    ) -> Applied {
        if seq < self.applied_results_seq {
            self.record_outcome(seq, CycleOutcome::Discarded);
            return Applied::Stale;
        }
        let last_updated = match marker {
            Some(marker) => {
                self.last_update = Some(marker.clone());
                marker
            }
            None if self.has_marker_feed => LastUpdate::unknown(),
            None => LastUpdate::observed_at(Utc::now()),
        };
        let asset_count = assets.len();

        self.applied_results_seq = seq;
        self.snapshot = Some(ScanSnapshot::new(assets, last_updated));
        self.load_error = None;
        self.record_outcome(seq, CycleOutcome::Loaded { asset_count });
        self.clamp_selection();
        Applied::Committed { asset_count }
    }

    pub fn apply_meta(&mut self, seq: u64, meta: ScanMeta) {
        if seq >= self.applied_results_seq {
            self.meta = Some(meta);
        }
    }

    /// Note a failed results fetch against its cycle. A marker of the same cycle
    /// is never committed. Only visible loads show the error state.
    pub fn record_results_failure(&mut self, seq: u64, mode: LoadMode, failure: &RetryFailure) {
        self.record_outcome(
            seq,
            CycleOutcome::Failed {
                message: failure.to_string(),
            },
        );
        if mode.is_silent() || seq < self.applied_results_seq {
            return;
        }
        self.load_error = Some(LoadError {
            kind: failure.error.kind(),
            message: failure.error.to_string(),
            attempts: failure.attempts,
        });
    }

    /// Show a cached snapshot when nothing fresher is on screen.
    pub fn restore_cached(&mut self, snapshot: ScanSnapshot) -> bool {
        if self.snapshot.is_some() {
            return false;
        }
        if self.last_update.is_none() {
            self.last_update = Some(snapshot.last_updated.clone());
        }
        self.snapshot = Some(snapshot);
        self.clamp_selection();
        true
    }

    /// Release the in-flight slot for `seq`. Returns `Some` exactly once per cycle.
    /// Results still waiting on a marker that never settled are committed without it.
    pub fn finish_cycle(&mut self, seq: u64) -> Option<FinishedCycle> {
        let in_flight = self.in_flight_mut(seq)?;
        if in_flight.marker == MarkerSlot::Awaiting {
            in_flight.marker = MarkerSlot::Unavailable;
        }
        self.try_commit(seq);
        self.in_flight.take().map(|in_flight| FinishedCycle {
            seq: in_flight.seq,
            mode: in_flight.mode,
            outcome: in_flight.outcome,
            elapsed: in_flight.started_at.elapsed(),
        })
    }

    fn in_flight_mut(&mut self, seq: u64) -> Option<&mut InFlight> {
        self.in_flight.as_mut().filter(|in_flight| in_flight.seq == seq)
    }

    /// Commit once both the results and the marker of `seq` have settled.
    fn try_commit(&mut self, seq: u64) -> Applied {
        let Some(in_flight) = self.in_flight_mut(seq) else {
            return Applied::Stale;
        };
        let marker = match &in_flight.marker {
            MarkerSlot::Awaiting => return Applied::Staged,
            MarkerSlot::Arrived(marker) => Some(marker.clone()),
            MarkerSlot::Unavailable => None,
        };
        let Some(assets) = in_flight.staged_results.take() else {
            return Applied::Staged;
        };
        self.commit_snapshot(seq, assets, marker)
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    pub fn select_next(&mut self) {
        let len = self.table_view().rows().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.table_view().rows().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn allocate_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn record_outcome(&mut self, seq: u64, outcome: CycleOutcome) {
        if let Some(in_flight) = self.in_flight.as_mut().filter(|f| f.seq == seq) {
            in_flight.outcome = Some(outcome);
        }
    }
}
