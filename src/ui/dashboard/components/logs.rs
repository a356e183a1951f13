//! Activity log panel

use super::super::state::DashboardState;
use super::super::utils::{
    clean_http_error_message, format_compact_timestamp, get_worker_color, sanitize_text,
};
use crate::events::{Event, EventType};
use crate::logging::LogLevel;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap};

fn status_icon(event: &Event) -> &'static str {
    match event.event_type {
        EventType::Success => "✅",
        EventType::Error if event.log_level >= LogLevel::Error => "❌",
        EventType::Error => "⚠",
        EventType::Refresh => "↻",
        EventType::Waiting => "…",
        EventType::Info => "•",
    }
}

/// `icon time [source] message`, with the message stripped of HTML noise and control characters.
fn log_line(event: &Event) -> Line<'static> {
    let message = sanitize_text(&clean_http_error_message(&event.msg));
    Line::from(vec![
        Span::raw(format!("{} ", status_icon(event))),
        Span::styled(
            format!("{} ", format_compact_timestamp(&event.timestamp)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("[{}] ", event.worker),
            Style::default().fg(get_worker_color(&event.worker)),
        ),
        Span::styled(message, Style::default().fg(Color::Gray)),
    ])
}

/// Render the activity log, newest first.
pub fn render_logs_panel(f: &mut Frame, area: Rect, state: &DashboardState) {
    // Borders and padding take four rows
    let visible = (area.height.saturating_sub(4) as usize).max(1);

    let lines: Vec<Line> = state
        .activity_logs
        .iter()
        .rev()
        .filter(|event| event.should_display())
        .take(visible)
        .map(log_line)
        .collect();

    let body = if lines.is_empty() {
        Paragraph::new(Line::from(Span::styled(
            "Waiting for the first load...",
            Style::default().fg(Color::DarkGray),
        )))
    } else {
        Paragraph::new(lines)
    };

    let block = Block::default()
        .title("ACTIVITY LOG")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .padding(Padding::uniform(1));

    f.render_widget(body.block(block).wrap(Wrap { trim: true }), area);
}
