//! Row selection for the results table.
//!
//! `select_rows` is the only place deciding what the table shows, so the table is
//! always a pure function of the current snapshot and the filter.

use crate::consts::cli_consts::{HIGH_SCORE_THRESHOLD, MEDIUM_SCORE_THRESHOLD};
use crate::types::{Asset, ScanSnapshot};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, strum::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum FilterState {
    #[default]
    #[strum(to_string = "All")]
    All,
    /// score >= 7
    #[strum(to_string = "High (7+)")]
    High,
    /// 4 <= score < 7
    #[strum(to_string = "Medium (4-7)")]
    Medium,
}

impl FilterState {
    pub fn matches(&self, asset: &Asset) -> bool {
        match self {
            FilterState::All => true,
            FilterState::High => asset
                .ai_score
                .is_some_and(|score| score >= HIGH_SCORE_THRESHOLD),
            FilterState::Medium => asset.ai_score.is_some_and(|score| {
                (MEDIUM_SCORE_THRESHOLD..HIGH_SCORE_THRESHOLD).contains(&score)
            }),
        }
    }

    /// Next value of the three-way selector.
    pub fn cycle(self) -> Self {
        match self {
            FilterState::All => FilterState::High,
            FilterState::High => FilterState::Medium,
            FilterState::Medium => FilterState::All,
        }
    }
}

/// What the results area should show.
#[derive(Debug, PartialEq)]
pub enum TableView<'a> {
    /// Nothing has been loaded yet.
    NoData,
    /// A snapshot arrived but the scanner found no assets matching its criteria.
    EmptySnapshot,
    /// The snapshot has assets but none pass the current filter.
    NoFilterMatch(FilterState),
    /// Matching assets in feed order.
    Rows(Vec<&'a Asset>),
}

impl<'a> TableView<'a> {
    pub fn message(&self) -> Option<String> {
        match self {
            TableView::NoData => Some("No scan data loaded yet".to_string()),
            TableView::EmptySnapshot => {
                Some("No assets currently match the scanner criteria".to_string())
            }
            TableView::NoFilterMatch(filter) => {
                Some(format!("No assets match the current filter: {}", filter))
            }
            TableView::Rows(_) => None,
        }
    }

    /// Rows borrow the snapshot, not the view.
    pub fn rows(&self) -> &[&'a Asset] {
        match self {
            TableView::Rows(rows) => rows,
            _ => &[],
        }
    }
}

/// Select the assets to display. Feed order is preserved; nothing is re-sorted.
pub fn select_rows(snapshot: Option<&ScanSnapshot>, filter: FilterState) -> TableView<'_> {
    let Some(snapshot) = snapshot else {
        return TableView::NoData;
    };
    if snapshot.is_empty() {
        return TableView::EmptySnapshot;
    }
    let rows: Vec<&Asset> = snapshot
        .assets
        .iter()
        .filter(|asset| filter.matches(asset))
        .collect();
    if rows.is_empty() {
        TableView::NoFilterMatch(filter)
    } else {
        TableView::Rows(rows)
    }
}
