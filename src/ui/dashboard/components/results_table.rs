//! Results table component
//!
//! Renders the filtered snapshot, its three empty states, and the load error state

use super::super::state::{DashboardState, LoadError};
use super::super::utils::{
    change_color, format_compact_usd, format_number, format_percent, format_price, format_score,
    sanitize_text, score_color, truncate,
};
use crate::filter::TableView;
use crate::types::Asset;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Padding, Paragraph, Row, Table, TableState, Wrap,
};

const WATCH_MARK: &str = "★";

fn table_block(state: &DashboardState) -> Block<'static> {
    Block::default()
        .title(format!("SIGNALS - {}", state.filter))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
}

/// Display name and symbol, both from the feed.
pub fn asset_label(asset: &Asset) -> String {
    let name = sanitize_text(asset.name.as_deref().unwrap_or(&asset.id));
    match asset.symbol.as_deref().map(sanitize_text) {
        Some(symbol) if !symbol.is_empty() => {
            format!("{} ({})", truncate(&name, 18), symbol.to_uppercase())
        }
        _ => truncate(&name, 24),
    }
}

fn error_lines(error: &LoadError) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            format!("{} after {} attempt(s)", error.kind, error.attempts),
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate(&sanitize_text(&error.message), 160),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[R] Retry",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
    ]
}

fn render_message(f: &mut Frame, area: Rect, state: &DashboardState, lines: Vec<Line<'static>>) {
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(table_block(state).padding(Padding::uniform(1)));
    f.render_widget(paragraph, area);
}

fn asset_row(asset: &Asset, watched: bool) -> Row<'static> {
    let mark = if watched { WATCH_MARK } else { " " };
    Row::new(vec![
        Cell::from(mark).style(Style::default().fg(Color::Yellow)),
        Cell::from(asset_label(asset)),
        Cell::from(format_price(asset.price)),
        Cell::from(format_percent(asset.change_24h))
            .style(Style::default().fg(change_color(asset.change_24h))),
        Cell::from(format_compact_usd(asset.volume)),
        Cell::from(format_score(asset.ai_score)).style(
            Style::default()
                .fg(score_color(asset.ai_score))
                .add_modifier(Modifier::BOLD),
        ),
        Cell::from(format_number(asset.confidence, 0)),
        Cell::from(format_number(asset.rsi, 1)),
    ])
}

/// Render the results area.
pub fn render_results_table(f: &mut Frame, area: Rect, state: &DashboardState) {
    // No snapshot to protect: the error takes the whole area
    if let (Some(error), None) = (&state.load_error, &state.snapshot) {
        render_message(f, area, state, error_lines(error));
        return;
    }

    let area = match &state.load_error {
        Some(error) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Fill(1)])
                .split(area);
            let banner = Paragraph::new(format!(
                " {} - showing previous data. [R] Retry",
                error.kind
            ))
            .style(Style::default().fg(Color::Black).bg(Color::LightRed));
            f.render_widget(banner, chunks[0]);
            chunks[1]
        }
        None => area,
    };

    let view = state.table_view();
    if let Some(message) = view.message() {
        let color = match view {
            TableView::NoData => Color::DarkGray,
            TableView::EmptySnapshot => Color::LightBlue,
            _ => Color::Yellow,
        };
        let lines = vec![Line::from(Span::styled(message, Style::default().fg(color)))];
        render_message(f, area, state, lines);
        return;
    }

    let header = Row::new(vec![
        "", "Asset", "Price", "24h", "Volume", "Score", "Conf %", "RSI",
    ])
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = view
        .rows()
        .iter()
        .map(|asset| asset_row(asset, state.watchlist.contains(&asset.id)))
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Fill(3),
        Constraint::Length(14),
        Constraint::Length(9),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(table_block(state))
        .row_highlight_style(
            Style::default()
                .bg(Color::Rgb(40, 48, 60))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut table_state = TableState::default().with_selected(Some(state.selected));
    f.render_stateful_widget(table, area, &mut table_state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_label_escapes_feed_text() {
        let mut asset = Asset::new("btc");
        asset.name = Some("Bit\x1b[2Jcoin".to_string());
        asset.symbol = Some("btc".to_string());
        assert_eq!(asset_label(&asset), "Bit[2Jcoin (BTC)");

        let bare = Asset::new("some-token");
        assert_eq!(asset_label(&bare), "some-token");
    }
}
