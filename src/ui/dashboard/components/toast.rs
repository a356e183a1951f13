//! Toast notification component

use super::super::state::{DashboardState, ToastKind};
use super::super::utils::{sanitize_text, truncate};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

/// Render the active toast in the bottom-right corner of `area`.
pub fn render_toast(f: &mut Frame, area: Rect, state: &DashboardState) {
    let Some(toast) = &state.toast else {
        return;
    };
    let color = match toast.kind {
        ToastKind::Success => Color::LightGreen,
        ToastKind::Error => Color::LightRed,
    };
    let message = truncate(&sanitize_text(&toast.message), 60);
    let width = (message.chars().count() as u16 + 4).min(area.width);
    let height = 3.min(area.height);
    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + area.height.saturating_sub(height + 3),
        width,
        height,
    };

    let paragraph = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color)),
        );
    f.render_widget(Clear, toast_area);
    f.render_widget(paragraph, toast_area);
}
