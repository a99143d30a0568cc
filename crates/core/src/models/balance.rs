use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a trade decision taken by a trading agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    #[serde(alias = "LONG", alias = "Long")]
    Long,
    #[serde(alias = "SHORT", alias = "Short")]
    Short,
    #[serde(alias = "HOLD", alias = "Hold")]
    Hold,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Long => write!(f, "long"),
            TradeSide::Short => write!(f, "short"),
            TradeSide::Hold => write!(f, "hold"),
        }
    }
}

/// One day of the account balance series.
///
/// `date` is the calendar-day key ("2024-01-01") and is matched against
/// `TradeMarker::date` by exact string equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceHistoryPoint {
    pub date: String,
    pub balance: f64,
    #[serde(with = "super::timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl BalanceHistoryPoint {
    /// `date|balance` with the balance rounded to cents. Two points with
    /// the same key are treated as the same value on the chart.
    #[must_use]
    pub fn normalized_key(&self) -> String {
        format!("{}|{:.2}", self.date, self.balance)
    }
}

/// A single executed trade, placed on the balance chart by its `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeMarker {
    pub id: String,

    #[serde(alias = "traderId")]
    pub trader_id: String,

    pub coin: String,
    pub side: TradeSide,

    #[serde(default)]
    pub quantity: f64,

    #[serde(default)]
    pub price: f64,

    #[serde(with = "super::timestamp")]
    pub timestamp: DateTime<Utc>,

    pub date: String,
}

impl TradeMarker {
    /// Identity plus the figures the tooltip shows, so a backend correction
    /// to price, quantity or execution time is picked up.
    #[must_use]
    pub fn normalized_key(&self) -> String {
        format!(
            "{}|{}|{}|{:.8}|{:.2}|{}",
            self.id,
            self.date,
            self.side,
            self.quantity,
            self.price,
            self.timestamp.timestamp_millis()
        )
    }
}

/// Response of `GET /dashboard/balance-history?days=N`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalanceHistoryResponse {
    #[serde(default)]
    pub history: Vec<BalanceHistoryPoint>,

    #[serde(default)]
    pub trades: Vec<TradeMarker>,
}
