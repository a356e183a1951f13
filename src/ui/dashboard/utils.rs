//! Dashboard utility functions
//!
//! Formatting helpers used across dashboard components. Everything the feed
//! provides goes through `sanitize_text` or `sanitize_url` before it is drawn.

use crate::consts::cli_consts::{HIGH_SCORE_THRESHOLD, MEDIUM_SCORE_THRESHOLD};
use crate::events::Worker;
use ratatui::prelude::Color;

/// Shown for missing or non-finite numbers.
pub const MISSING: &str = "N/A";

/// Get a ratatui color for a worker based on its type
pub fn get_worker_color(worker: &Worker) -> Color {
    match worker {
        Worker::Loader => Color::Cyan,
        Worker::PeriodicCheck => Color::Yellow,
        Worker::Dashboard => Color::Green,
    }
}

/// Format compact timestamp with date and time from full timestamp
pub fn format_compact_timestamp(timestamp: &str) -> String {
    // Extract from "YYYY-MM-DD HH:MM:SS" format
    let mut parts = timestamp.split(' ');
    if let (Some(date_part), Some(time_part)) = (parts.next(), parts.next()) {
        if let (Some(month_day), Some(hour_min)) = (date_part.get(5..10), time_part.get(0..5)) {
            return format!("{} {}", month_day, hour_min);
        }
    }
    // Fallback to original timestamp if parsing fails
    timestamp.to_string()
}

/// Clean HTTP error messages
pub fn clean_http_error_message(msg: &str) -> String {
    if msg.contains("Reqwest error") && msg.contains("timed out") {
        return "Request timed out".to_string();
    }
    if msg.contains("Reqwest error") && msg.contains("connect") {
        return "Could not connect to the feed".to_string();
    }
    if msg.contains("Reqwest error") {
        return "Network error".to_string();
    }
    msg.to_string()
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn group_thousands(integer: u64) -> String {
    let digits = integer.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `$64,123.45` for prices above a dollar, up to six decimals below.
pub fn format_price(price: Option<f64>) -> String {
    let Some(price) = finite(price) else {
        return MISSING.to_string();
    };
    let sign = if price < 0.0 { "-" } else { "" };
    let abs = price.abs();
    if abs >= 1.0 {
        let cents = (abs * 100.0).round() as u64;
        format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
    } else if abs == 0.0 {
        "$0.00".to_string()
    } else {
        let text = format!("{:.6}", abs);
        let text = text.trim_end_matches('0');
        format!("{}${}", sign, text)
    }
}

/// Signed percentage with two decimals.
pub fn format_percent(change: Option<f64>) -> String {
    match finite(change) {
        Some(change) => format!("{:+.2}%", change),
        None => MISSING.to_string(),
    }
}

/// `$1.23B`, `$456.7M`, `$12.3K`.
pub fn format_compact_usd(value: Option<f64>) -> String {
    let Some(value) = finite(value) else {
        return MISSING.to_string();
    };
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1e12 {
        format!("{}${:.2}T", sign, abs / 1e12)
    } else if abs >= 1e9 {
        format!("{}${:.2}B", sign, abs / 1e9)
    } else if abs >= 1e6 {
        format!("{}${:.1}M", sign, abs / 1e6)
    } else if abs >= 1e3 {
        format!("{}${:.1}K", sign, abs / 1e3)
    } else {
        format!("{}${:.0}", sign, abs)
    }
}

/// Generic number with a fixed number of decimals.
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match finite(value) {
        Some(value) => format!("{:.*}", decimals, value),
        None => MISSING.to_string(),
    }
}

pub fn format_score(score: Option<f64>) -> String {
    format_number(score, 1)
}

pub fn score_color(score: Option<f64>) -> Color {
    match finite(score) {
        Some(score) if score >= HIGH_SCORE_THRESHOLD => Color::LightGreen,
        Some(score) if score >= MEDIUM_SCORE_THRESHOLD => Color::Yellow,
        Some(_) => Color::LightRed,
        None => Color::DarkGray,
    }
}

pub fn change_color(change: Option<f64>) -> Color {
    match finite(change) {
        Some(change) if change > 0.0 => Color::LightGreen,
        Some(change) if change < 0.0 => Color::LightRed,
        _ => Color::Gray,
    }
}

/// Bearish below 0.4, Neutral below 0.6, Bullish otherwise.
pub fn sentiment_label(sentiment: f64) -> &'static str {
    if sentiment < 0.4 {
        "Bearish"
    } else if sentiment < 0.6 {
        "Neutral"
    } else {
        "Bullish"
    }
}

pub fn sentiment_color(sentiment: f64) -> Color {
    match sentiment_label(sentiment) {
        "Bearish" => Color::LightRed,
        "Neutral" => Color::Yellow,
        _ => Color::LightGreen,
    }
}

/// Strip terminal control sequences and other control characters from feed text.
/// Line breaks and tabs become spaces.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            // Bidi overrides can visually reorder the rest of the line
            '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' => None,
            c => Some(c),
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Accept only absolute http(s) links without whitespace or control characters.
pub fn sanitize_url(url: &str) -> Option<String> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    let has_scheme = lower.starts_with("https://") || lower.starts_with("http://");
    let clean = !url.chars().any(|c| c.is_control() || c.is_whitespace());
    let has_host = url
        .split_once("://")
        .is_some_and(|(_, rest)| !rest.is_empty() && !rest.starts_with('/'));
    (has_scheme && clean && has_host).then(|| url.to_string())
}

/// Cut to `max_chars` characters, marking the cut with "...".
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Some(64123.456)), "$64,123.46");
        assert_eq!(format_price(Some(1.0)), "$1.00");
        assert_eq!(format_price(Some(0.000123)), "$0.000123");
        assert_eq!(format_price(Some(0.5)), "$0.5");
        assert_eq!(format_price(None), MISSING);
        assert_eq!(format_price(Some(f64::NAN)), MISSING);
    }

    #[test]
    fn test_format_percent_and_compact() {
        assert_eq!(format_percent(Some(2.5)), "+2.50%");
        assert_eq!(format_percent(Some(-1.0)), "-1.00%");
        assert_eq!(format_compact_usd(Some(1_234_000_000.0)), "$1.23B");
        assert_eq!(format_compact_usd(Some(456_700_000.0)), "$456.7M");
        assert_eq!(format_compact_usd(Some(12_300.0)), "$12.3K");
        assert_eq!(format_compact_usd(None), MISSING);
    }

    #[test]
    fn test_score_colors() {
        assert_eq!(score_color(Some(7.0)), Color::LightGreen);
        assert_eq!(score_color(Some(4.0)), Color::Yellow);
        assert_eq!(score_color(Some(3.9)), Color::LightRed);
        assert_eq!(score_color(None), Color::DarkGray);
    }

    #[test]
    fn test_sentiment_labels() {
        assert_eq!(sentiment_label(0.39), "Bearish");
        assert_eq!(sentiment_label(0.4), "Neutral");
        assert_eq!(sentiment_label(0.6), "Bullish");
    }

    #[test]
    fn test_sanitize_text_strips_escape_sequences() {
        assert_eq!(sanitize_text("Bit\x1b[31mcoin"), "Bit[31mcoin");
        assert_eq!(sanitize_text("line\nbreak\t"), "line break");
        assert_eq!(sanitize_text("evil\u{202E}txt"), "eviltxt");
        assert_eq!(sanitize_text("<script>alert(1)</script>"), "<script>alert(1)</script>");
    }

    #[test]
    fn test_sanitize_url() {
        assert_eq!(
            sanitize_url(" https://www.coingecko.com/en/coins/bitcoin "),
            Some("https://www.coingecko.com/en/coins/bitcoin".to_string())
        );
        assert_eq!(sanitize_url("javascript:alert(1)"), None);
        assert_eq!(sanitize_url("https://evil.com/\x1b]8;;x"), None);
        assert_eq!(sanitize_url("http:///nohost"), None);
        assert_eq!(sanitize_url("ftp://files"), None);
    }

    #[test]
    fn test_truncate_and_timestamps() {
        assert_eq!(truncate("Bitcoin", 10), "Bitcoin");
        assert_eq!(truncate("Wrapped Bitcoin", 10), "Wrapped...");
        assert_eq!(format_compact_timestamp("2024-05-01 12:30:45"), "05-01 12:30");
        assert_eq!(format_compact_timestamp("garbage"), "garbage");
    }

    #[test]
    fn test_clean_http_error_message() {
        assert_eq!(
            clean_http_error_message("Reqwest error: error sending request: operation timed out"),
            "Request timed out"
        );
        assert_eq!(clean_http_error_message("Parse error: x"), "Parse error: x");
    }
}
