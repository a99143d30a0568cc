use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An exchange account the user has linked. Keys themselves never reach the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerConnection {
    pub id: String,

    /// Exchange identifier, e.g. "binance".
    #[serde(alias = "broker_name")]
    pub broker: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default, with = "super::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Response of `GET /brokers/connections`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrokerConnectionsResponse {
    #[serde(default)]
    pub connections: Vec<BrokerConnection>,
}
