//! Dashboard footer component
//!
//! Renders the refresh control and key bindings

use super::super::state::DashboardState;
use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

/// Render footer. The refresh control is dimmed while a load is in flight.
pub fn render_footer(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let refresh_style = if state.is_refreshing() {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC)
    } else {
        Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD)
    };

    let mut spans = vec![Span::styled(state.refresh_label(), refresh_style)];
    if state.marker_check_outstanding() {
        spans.push(Span::styled(
            " (checking)",
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(
        Span::styled(
            " | [F] Filter [1/2/3] All/High/Medium | [Up/Down] Select | [Enter] Details | [W] Watch | [Q] Quit",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    );

    let footer = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_type(BorderType::Thick),
        );
    f.render_widget(footer, area);
}
