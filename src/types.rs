//! Feed data model
//!
//! Everything here is produced by the external scanner; the dashboard only reads it.
//! Deserialization is deliberately lenient field by field so that one malformed
//! value never takes down a whole record, and one malformed record never takes
//! down the whole feed.

use crate::consts::cli_consts::links;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Risk parameters suggested by the scanner for one asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskBlock {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub stop_loss: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub take_profit: Option<f64>,
    /// Percent of portfolio.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub position_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub risk_reward: Option<f64>,
}

/// One entry of the results feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,

    #[serde(default, alias = "current_price", deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(
        default,
        alias = "price_change_percentage_24h",
        deserialize_with = "lenient_f64"
    )]
    pub change_24h: Option<f64>,
    #[serde(default, alias = "total_volume", deserialize_with = "lenient_f64")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub market_cap: Option<f64>,

    /// Opaque 0-10 ranking computed by the scanner.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ai_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub rsi: Option<f64>,
    /// Relative volume.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rvol: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub ema_alignment: Option<bool>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub vwap_proximity: Option<f64>,

    /// 0.0 - 1.0
    #[serde(default, deserialize_with = "lenient_f64")]
    pub news_sentiment: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub twitter_mentions: Option<u64>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,

    #[serde(default, alias = "chart_url", deserialize_with = "lenient_string")]
    pub tradingview_url: Option<String>,
    #[serde(default, alias = "source_url", deserialize_with = "lenient_string")]
    pub coingecko_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub news_url: Option<String>,

    #[serde(default, deserialize_with = "lenient_risk")]
    pub risk: Option<RiskBlock>,
}

impl Asset {
    /// Bare record for fixtures.
    #[cfg(test)]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            symbol: None,
            image: None,
            price: None,
            change_24h: None,
            volume: None,
            market_cap: None,
            ai_score: None,
            confidence: None,
            rsi: None,
            rvol: None,
            ema_alignment: None,
            vwap_proximity: None,
            news_sentiment: None,
            twitter_mentions: None,
            timestamp: None,
            tradingview_url: None,
            coingecko_url: None,
            news_url: None,
            risk: None,
        }
    }

    #[cfg(test)]
    pub fn with_score(mut self, score: f64) -> Self {
        self.ai_score = Some(score);
        self
    }

    /// Normalized image URL: placeholder when missing, CoinGecko-relative paths made absolute.
    pub fn image_url(&self) -> String {
        match self.image.as_deref().map(str::trim) {
            None | Some("") => links::PLACEHOLDER_IMAGE_URL.to_string(),
            Some(url) if url.starts_with("http") => url.to_string(),
            Some(path) => format!(
                "{}/{}",
                links::COINGECKO_BASE_URL,
                path.trim_start_matches('/')
            ),
        }
    }

    /// Chart link, derived from the symbol when the feed omits it.
    pub fn chart_url(&self) -> Option<String> {
        self.tradingview_url.clone().or_else(|| {
            self.symbol.as_ref().map(|symbol| {
                format!(
                    "{}{}USD",
                    links::TRADINGVIEW_CHART_URL,
                    symbol.trim().to_uppercase()
                )
            })
        })
    }

    pub fn source_url(&self) -> String {
        self.coingecko_url
            .clone()
            .unwrap_or_else(|| format!("{}/en/coins/{}", links::COINGECKO_BASE_URL, self.id))
    }

    pub fn news_link(&self) -> String {
        self.news_url
            .clone()
            .unwrap_or_else(|| format!("{}/en/coins/{}/news", links::COINGECKO_BASE_URL, self.id))
    }
}

/// Parse the results feed body into assets.
///
/// The body must be a JSON array. Elements that are not objects or lack a string
/// `id` are skipped rather than failing the whole feed.
pub fn parse_assets(body: &str) -> Result<Vec<Asset>, serde_json::Error> {
    let elements: Vec<Value> = serde_json::from_str(body)?;
    let mut assets = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<Asset>(element) {
            Ok(asset) => assets.push(asset),
            Err(e) => log::debug!("Skipping malformed asset record #{}: {}", index, e),
        }
    }
    Ok(assets)
}

/// The last-update marker published next to the results.
///
/// Unparseable content is not an error: `parsed` stays `None` and the label
/// falls back to a placeholder. `raw` is kept for change detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastUpdate {
    pub raw: String,
    pub parsed: Option<DateTime<Utc>>,
}

impl LastUpdate {
    pub const PLACEHOLDER: &'static str = "Unknown";

    pub fn parse(text: &str) -> Self {
        let raw = text.trim().to_string();
        let parsed = parse_timestamp_text(&raw);
        Self { raw, parsed }
    }

    /// Marker for sources that publish no last-update feed: the time the results arrived.
    pub fn observed_at(at: DateTime<Utc>) -> Self {
        Self {
            raw: at.to_rfc3339(),
            parsed: Some(at),
        }
    }

    pub fn unknown() -> Self {
        Self {
            raw: String::new(),
            parsed: None,
        }
    }

    pub fn label(&self) -> String {
        match self.parsed {
            Some(at) => at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            None => Self::PLACEHOLDER.to_string(),
        }
    }
}

/// Optional status document published by the scanner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanMeta {
    #[serde(
        default,
        alias = "total_assets",
        alias = "count",
        deserialize_with = "lenient_u64"
    )]
    pub asset_count: Option<u64>,
    #[serde(default, alias = "last_update", deserialize_with = "lenient_string")]
    pub last_scan: Option<String>,
}

/// The full set of assets as of one successful fetch. Replaced wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSnapshot {
    pub assets: Vec<Asset>,
    pub last_updated: LastUpdate,
    pub fetched_at: DateTime<Utc>,
    /// Restored from the on-disk cache rather than fetched in this session.
    #[serde(skip)]
    pub from_cache: bool,
}

impl ScanSnapshot {
    pub fn new(assets: Vec<Asset>, last_updated: LastUpdate) -> Self {
        Self {
            assets,
            last_updated,
            fetched_at: Utc::now(),
            from_cache: false,
        }
    }

    /// Same assets, newer marker.
    pub fn with_last_updated(mut self, last_updated: LastUpdate) -> Self {
        self.last_updated = last_updated;
        self
    }

    pub fn find(&self, asset_id: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.id == asset_id)
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Mean news sentiment over the assets that report one.
    pub fn average_sentiment(&self) -> Option<f64> {
        let values: Vec<f64> = self
            .assets
            .iter()
            .filter_map(|asset| asset.news_sentiment)
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

// =============================================================================
// TIMESTAMP PARSING
// =============================================================================

const MARKER_KEYS: [&str; 5] = [
    "last_update",
    "last_updated",
    "timestamp",
    "updated_at",
    "last_scan",
];

fn parse_timestamp_text(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        if let Some(at) = timestamp_from_json(&value) {
            return Some(at);
        }
    }
    parse_datetime_str(raw)
}

fn timestamp_from_json(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_datetime_str(s),
        Value::Number(n) => n.as_f64().and_then(from_epoch),
        Value::Object(map) => MARKER_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(timestamp_from_json),
        _ => None,
    }
}

fn parse_datetime_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Some(at.with_timezone(&Utc));
    }
    // Naive timestamps (e.g. Python's utcnow().isoformat()) are UTC
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    s.parse::<f64>().ok().and_then(from_epoch)
}

/// Seconds or milliseconds since the epoch.
fn from_epoch(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    let millis = if value > 1e12 { value } else { value * 1000.0 };
    DateTime::from_timestamp_millis(millis as i64)
}

// =============================================================================
// LENIENT FIELD DESERIALIZERS
// =============================================================================

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_from_value)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u64))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_risk<'de, D>(deserializer: D) -> Result<Option<RiskBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
