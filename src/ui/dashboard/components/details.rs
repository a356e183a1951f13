//! Details popup component
//!
//! Read-only view of one full asset record

use super::super::state::DashboardState;
use super::super::utils::{
    MISSING, format_compact_usd, format_number, format_percent, format_price, format_score,
    sanitize_text, sanitize_url, score_color,
};
use super::results_table::asset_label;
use crate::types::Asset;

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn field(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<16}", label), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn link(label: &'static str, url: Option<String>) -> Line<'static> {
    let value = url
        .as_deref()
        .and_then(sanitize_url)
        .unwrap_or_else(|| MISSING.to_string());
    Line::from(vec![
        Span::styled(format!("  {:<16}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::LightBlue)),
    ])
}

fn with_unit(value: String, unit: &str) -> String {
    if value == MISSING { value } else { value + unit }
}

fn yes_no(value: Option<bool>) -> String {
    match value {
        Some(true) => "Aligned".to_string(),
        Some(false) => "Not aligned".to_string(),
        None => MISSING.to_string(),
    }
}

/// Lines of the details view. Missing fields render as placeholders.
pub fn detail_lines(asset: &Asset, watched: bool) -> Vec<Line<'static>> {
    let risk = asset.risk.clone().unwrap_or_default();
    let watch_text = if watched { "On watchlist" } else { "Not watched" };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                asset_label(asset),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("   score {}", format_score(asset.ai_score)),
                Style::default().fg(score_color(asset.ai_score)),
            ),
        ]),
        Line::from(Span::styled(watch_text, Style::default().fg(Color::Yellow))),
        Line::from(""),
        section("MARKET"),
        field("Price", format_price(asset.price)),
        field("24h change", format_percent(asset.change_24h)),
        field("Volume", format_compact_usd(asset.volume)),
        field("Market cap", format_compact_usd(asset.market_cap)),
        field("Confidence", with_unit(format_number(asset.confidence, 0), "%")),
        Line::from(""),
        section("TECHNICALS"),
        field("RSI", format_number(asset.rsi, 1)),
        field("Relative volume", format_number(asset.rvol, 2)),
        field("EMA alignment", yes_no(asset.ema_alignment)),
        field("VWAP proximity", format_percent(asset.vwap_proximity)),
        Line::from(""),
        section("RISK"),
        field("Stop loss", format_price(risk.stop_loss)),
        field("Take profit", format_price(risk.take_profit)),
        field(
            "Position size",
            with_unit(format_number(risk.position_size, 1), "%"),
        ),
        field("Risk/reward", format_number(risk.risk_reward, 2)),
        Line::from(""),
        section("SENTIMENT"),
        field("News", format_number(asset.news_sentiment, 2)),
        field(
            "Social mentions",
            asset
                .twitter_mentions
                .map_or_else(|| MISSING.to_string(), |n| n.to_string()),
        ),
        Line::from(""),
        section("LINKS"),
        link("Chart", asset.chart_url()),
        link("Source", Some(asset.source_url())),
        link("News", Some(asset.news_link())),
        link("Image", Some(asset.image_url())),
    ];
    if let Some(timestamp) = asset.timestamp.as_deref() {
        lines.push(Line::from(""));
        lines.push(field("Scanned at", sanitize_text(timestamp)));
    }
    lines
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// Render the popup if one is open and its asset still exists.
pub fn render_details(f: &mut Frame, state: &DashboardState) {
    let Some(asset) = state.details_asset() else {
        return;
    };
    let area = popup_area(f.area(), 60, 80);
    let block = Block::default()
        .title("DETAILS  [Esc] Close  [W] Watch")
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::LightCyan))
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Rgb(22, 27, 34)));

    let paragraph = Paragraph::new(detail_lines(asset, state.watchlist.contains(&asset.id)))
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_sparse_record_renders_placeholders() {
        let rendered = text(&detail_lines(&Asset::new("pepe"), false));
        assert!(rendered.contains("Not watched"));
        assert!(rendered.contains(MISSING));
        assert!(rendered.contains("https://www.coingecko.com/en/coins/pepe/news"));
    }

    #[test]
    fn test_unsafe_links_are_not_shown() {
        let mut asset = Asset::new("btc");
        asset.tradingview_url = Some("javascript:alert(1)".to_string());
        let rendered = text(&detail_lines(&asset, true));
        assert!(!rendered.contains("javascript"));
        assert!(rendered.contains("On watchlist"));
    }
}
