//! Dashboard header component
//!
//! Renders the title and the market sentiment gauge

use super::super::state::DashboardState;
use super::super::utils::{sentiment_color, sentiment_label};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

/// Render header with title and sentiment (or loading) gauge.
pub fn render_header(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let header_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let version = env!("CARGO_PKG_VERSION");
    let title = Paragraph::new(format!("CRYPTO SIGNAL SCANNER v{}", version))
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_type(BorderType::Thick),
        );
    f.render_widget(title, header_chunks[0]);

    let sentiment = state
        .snapshot
        .as_ref()
        .and_then(|snapshot| snapshot.average_sentiment());

    // A visible load animates the gauge; otherwise it shows market sentiment
    let (progress_text, gauge_color, progress_percent) = match (state.in_flight(), sentiment) {
        (Some(in_flight), _) if !in_flight.mode.is_silent() => {
            // Loops every 20 ticks
            let progress = ((state.tick % 20) as f64 / 20.0 * 100.0) as u16;
            (
                format!("LOADING - {} load in progress", in_flight.mode),
                Color::LightBlue,
                progress,
            )
        }
        (_, Some(value)) => {
            let percent = (value.clamp(0.0, 1.0) * 100.0).round() as u16;
            (
                format!(
                    "MARKET SENTIMENT - {} ({}%)",
                    sentiment_label(value),
                    percent
                ),
                sentiment_color(value),
                percent,
            )
        }
        (_, None) => ("MARKET SENTIMENT - No data".to_string(), Color::DarkGray, 0),
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .gauge_style(
            Style::default()
                .fg(gauge_color)
                .add_modifier(Modifier::BOLD),
        )
        .percent(progress_percent.min(100))
        .label(progress_text);

    f.render_widget(gauge, header_chunks[1]);
}
