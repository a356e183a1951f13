//! Plain-text rendering of the current table for headless output

use crate::ui::dashboard::DashboardState;
use crate::ui::dashboard::components::results_table::asset_label;
use crate::ui::dashboard::utils::{format_percent, format_price, format_score, sanitize_text};

/// The filtered table as aligned text, or the empty-state message.
pub fn render_report(state: &DashboardState) -> String {
    let view = state.table_view();
    let mut out = format!(
        "Source: {} | Last updated: {} | Filter: {}",
        state.environment,
        state.last_updated_label(),
        state.filter
    );
    if state.snapshot.as_ref().is_some_and(|s| s.from_cache) {
        out.push_str(" | cached");
    }
    out.push('\n');

    if let Some(message) = view.message() {
        out.push_str(&message);
        out.push('\n');
        return out;
    }

    out.push_str(&format!(
        "  {:<28} {:>14} {:>9} {:>6} {:>6}\n",
        "ASSET", "PRICE", "24H", "SCORE", "CONF"
    ));
    for asset in view.rows() {
        let mark = if state.watchlist.contains(&asset.id) {
            '*'
        } else {
            ' '
        };
        out.push_str(&format!(
            "{} {:<28} {:>14} {:>9} {:>6} {:>6}\n",
            mark,
            asset_label(asset),
            format_price(asset.price),
            format_percent(asset.change_24h),
            format_score(asset.ai_score),
            format_score(asset.confidence),
        ));
    }
    if let Some(error) = &state.load_error {
        out.push_str(&format!(
            "Last refresh failed: {}\n",
            sanitize_text(&error.message)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::events::LoadMode;
    use crate::filter::FilterState;
    use crate::storage::Watchlist;
    use crate::types::{Asset, LastUpdate};
    use crate::ui::dashboard::UIConfig;
    use std::time::Instant;

    fn state_with(assets: Vec<Asset>) -> DashboardState {
        let watchlist: Watchlist = ["eth".to_string()].into_iter().collect();
        let mut state = DashboardState::new(
            Environment::Local,
            Instant::now(),
            watchlist,
            UIConfig::new(false, true),
        );
        let seq = state.begin_load(LoadMode::Initial).unwrap();
        state.stage_last_update(seq, LastUpdate::parse("2024-05-01T12:30:00Z"));
        state.stage_results(seq, assets);
        state.finish_cycle(seq);
        state
    }

    #[test]
    fn test_report_lists_filtered_rows_with_watch_mark() {
        let mut state = state_with(vec![
            Asset::new("btc").with_score(8.0),
            Asset::new("eth").with_score(7.2),
            Asset::new("doge").with_score(2.0),
        ]);
        state.filter = FilterState::High;

        let report = render_report(&state);
        let lines: Vec<&str> = report.lines().collect();
        assert!(lines[0].contains("Filter: High (7+)"));
        assert!(lines[1].contains("ASSET"));
        assert!(lines[2].starts_with("  btc"));
        assert!(lines[3].starts_with("* eth"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_report_shows_empty_state_message() {
        let state = state_with(Vec::new());
        let report = render_report(&state);
        assert!(report.contains("No assets currently match the scanner criteria"));
        assert!(!report.contains("ASSET"));
    }
}
