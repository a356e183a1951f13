//! Dashboard info panel component
//!
//! Renders the feed status readout

use crate::environment::Environment;

use super::super::state::DashboardState;
use super::super::utils::sanitize_text;
use ratatui::Frame;
use ratatui::prelude::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap};

fn format_uptime(secs: u64) -> String {
    if secs >= 86400 {
        format!(
            "Uptime: {}d {}h {}m",
            secs / 86400,
            (secs % 86400) / 3600,
            (secs % 3600) / 60
        )
    } else if secs >= 3600 {
        format!(
            "Uptime: {}h {}m {}s",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    } else {
        format!("Uptime: {}m {}s", secs / 60, secs % 60)
    }
}

fn styled(text: String, color: Color) -> Line<'static> {
    Line::from(vec![Span::styled(text, Style::default().fg(color))])
}

/// Render status panel: source, freshness, counts and filter.
pub fn render_info_panel(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let mut info_lines = Vec::new();

    let env_color = match state.environment {
        Environment::Local => Color::Green,
        Environment::ScanApi => Color::LightBlue,
        Environment::Custom { .. } => Color::Yellow,
    };
    info_lines.push(styled(format!("Source: {}", state.environment), env_color));

    info_lines.push(styled(
        format!("Updated: {}", state.last_updated_label()),
        Color::Cyan,
    ));

    let asset_count = state.snapshot.as_ref().map_or(0, |s| s.assets.len());
    let assets_text = match state.meta.as_ref().and_then(|meta| meta.asset_count) {
        Some(scanned) => format!("Assets: {} (scanned {})", asset_count, scanned),
        None => format!("Assets: {}", asset_count),
    };
    info_lines.push(styled(assets_text, Color::LightYellow));

    if let Some(last_scan) = state.meta.as_ref().and_then(|meta| meta.last_scan.as_deref()) {
        info_lines.push(styled(
            format!("Last scan: {}", sanitize_text(last_scan)),
            Color::Gray,
        ));
    }

    info_lines.push(styled(format!("Filter: {}", state.filter), Color::LightMagenta));
    info_lines.push(styled(
        format!("Watchlist: {}", state.watchlist.len()),
        Color::LightYellow,
    ));

    if state.snapshot.as_ref().is_some_and(|s| s.from_cache) {
        info_lines.push(styled("Showing cached data".to_string(), Color::LightRed));
    }

    info_lines.push(styled(
        format_uptime(state.start_time.elapsed().as_secs()),
        Color::LightGreen,
    ));

    let info_block = Block::default()
        .title("STATUS")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .padding(Padding::uniform(1));

    let info_paragraph = Paragraph::new(info_lines)
        .block(info_block)
        .wrap(Wrap { trim: true });
    f.render_widget(info_paragraph, area);
}
