use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 24h ticker summary for one coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    pub symbol: String,

    #[serde(default)]
    pub price: f64,

    #[serde(default, alias = "change24h")]
    pub change_24h: f64,

    #[serde(default, alias = "volume24h")]
    pub volume_24h: f64,

    #[serde(default, alias = "high24h")]
    pub high_24h: Option<f64>,

    #[serde(default, alias = "low24h")]
    pub low_24h: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketHistoryPoint {
    #[serde(with = "super::timestamp")]
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Price series per symbol, keyed by symbol.
pub type HistoryData = BTreeMap<String, Vec<MarketHistoryPoint>>;

/// Response of `GET /api/market/cached` and `POST /api/market/refresh`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketResponse {
    #[serde(default)]
    pub overview: Vec<MarketOverview>,

    #[serde(default)]
    pub history: HistoryData,

    #[serde(default, with = "super::timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MarketResponse {
    /// A cache miss comes back as an empty body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overview.is_empty() && self.history.is_empty()
    }
}
