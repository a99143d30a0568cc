use serde::{Deserialize, Serialize};

use super::balance::TradeSide;

/// Body of `POST /dashboard/execute`. Without a trader id the backend
/// runs every active agent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecuteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trader_id: Option<String>,
}

/// Outcome of one agent's execution cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,

    #[serde(default, alias = "traderId")]
    pub trader_id: Option<String>,

    #[serde(default)]
    pub trader_name: Option<String>,

    #[serde(default)]
    pub coin: Option<String>,

    #[serde(default, alias = "decision")]
    pub action: Option<TradeSide>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `POST /dashboard/execute`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default)]
    pub results: Vec<ExecutionResult>,
}

impl ExecuteResponse {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}
