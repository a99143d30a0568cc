use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::balance::{BalanceHistoryPoint, TradeSide};

/// Balance of one linked exchange account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerBalance {
    #[serde(alias = "broker_name")]
    pub broker: String,

    #[serde(default)]
    pub total_balance: f64,

    #[serde(default)]
    pub available_balance: f64,

    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USDT".to_string()
}

/// Open position derived server-side from exchange state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coin: String,
    pub side: TradeSide,

    #[serde(default)]
    pub quantity: f64,

    #[serde(default)]
    pub entry_price: f64,

    #[serde(default)]
    pub current_price: Option<f64>,

    #[serde(default)]
    pub unrealized_pnl: f64,

    #[serde(default)]
    pub broker: Option<String>,
}

/// A trade executed by one of the user's trading agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,

    #[serde(alias = "traderId")]
    pub trader_id: String,

    pub coin: String,
    pub side: TradeSide,

    #[serde(default)]
    pub quantity: f64,

    #[serde(default)]
    pub price: f64,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(with = "super::timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Audit record of one call the backend made to an exchange or LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiLog {
    pub id: String,

    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(with = "super::timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// A configured LLM trading agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderSummary {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub is_active: bool,
}

/// Full replacement value for the dashboard, as produced by the backend's
/// cached and refresh endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default, alias = "balances")]
    pub broker_balances: Vec<BrokerBalance>,

    #[serde(default)]
    pub positions: Vec<Position>,

    #[serde(default)]
    pub trades: Vec<Trade>,

    #[serde(default)]
    pub api_logs: Vec<ApiLog>,

    #[serde(default)]
    pub traders: Vec<TraderSummary>,

    /// Some backends embed the balance series in the snapshot. When present
    /// it goes through the same change check as the balance-history endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_history: Option<Vec<BalanceHistoryPoint>>,
}

/// Response of `GET /dashboard/cached`.
#[derive(Debug, Clone, Deserialize)]
pub struct CachedDashboardResponse {
    #[serde(default)]
    pub cached: bool,

    #[serde(default)]
    pub data: Option<DashboardSnapshot>,

    #[serde(default, with = "super::timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CachedDashboardResponse {
    /// The snapshot, if the backend actually had one cached.
    pub fn into_snapshot(self) -> Option<(DashboardSnapshot, Option<DateTime<Utc>>)> {
        match (self.cached, self.data) {
            (true, Some(data)) => Some((data, self.updated_at)),
            _ => None,
        }
    }
}

/// Response of `POST /dashboard/refresh`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshDashboardResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub data: Option<DashboardSnapshot>,

    #[serde(default)]
    pub error: Option<String>,
}
