//! Dashboard main renderer

use super::components::{details, footer, header, info_panel, logs, results_table, toast};
use super::state::DashboardState;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Color, Style};
use ratatui::widgets::Block;

pub fn render_dashboard(f: &mut Frame, state: &DashboardState) {
    if state.with_background_color {
        f.render_widget(
            Block::default().style(Style::default().bg(Color::Rgb(16, 20, 24))),
            f.area(),
        );
    }

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Fill(1),
            Constraint::Percentage(25),
            Constraint::Length(2),
        ])
        .margin(1)
        .split(f.area());

    header::render_header(f, main_chunks[0], state);
    results_table::render_results_table(f, main_chunks[1], state);

    let bottom_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(main_chunks[2]);

    info_panel::render_info_panel(f, bottom_chunks[0], state);
    logs::render_logs_panel(f, bottom_chunks[1], state);
    footer::render_footer(f, main_chunks[3], state);

    toast::render_toast(f, f.area(), state);
    details::render_details(f, state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::storage::Watchlist;
    use crate::types::Asset;
    use crate::ui::dashboard::state::UIConfig;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::time::Instant;

    fn screen_text(state: &DashboardState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 48)).unwrap();
        terminal.draw(|f| render_dashboard(f, state)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    fn state() -> DashboardState {
        DashboardState::new(
            Environment::Local,
            Instant::now(),
            Watchlist::default(),
            UIConfig::new(false, true),
        )
    }

    #[test]
    fn test_empty_states_render_distinct_messages() {
        let mut state = state();
        assert!(screen_text(&state).contains("No scan data loaded yet"));

        state.commit_snapshot(1, vec![], None);
        assert!(screen_text(&state).contains("No assets currently match the scanner criteria"));
    }

    #[test]
    fn test_rows_and_watch_mark_render() {
        let mut state = state();
        state.watchlist.add("btc");
        let mut btc = Asset::new("btc").with_score(8.0);
        btc.name = Some("Bitcoin".to_string());
        btc.symbol = Some("btc".to_string());
        state.commit_snapshot(1, vec![btc, Asset::new("doge").with_score(2.0)], None);

        let text = screen_text(&state);
        assert!(text.contains("Bitcoin (BTC)"));
        assert!(text.contains("★"));
        assert!(text.contains("doge"));
    }
}
