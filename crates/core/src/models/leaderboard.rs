use serde::{Deserialize, Serialize};

/// One ranked row of the public leaderboard. Ranking is computed server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,

    #[serde(alias = "userName", alias = "name")]
    pub user_name: String,

    #[serde(default, alias = "traderName")]
    pub trader_name: Option<String>,

    #[serde(default)]
    pub balance: f64,

    #[serde(default, alias = "pnl")]
    pub total_pnl: f64,

    #[serde(default, alias = "pnlPercent")]
    pub pnl_percent: f64,

    #[serde(default, alias = "tradeCount")]
    pub trade_count: u32,
}

/// Response of `GET /api/leaderboard`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardResponse {
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,

    #[serde(default, alias = "currentUser")]
    pub current_user: Option<LeaderboardEntry>,
}
