use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::CoreError;

/// Client configuration for a dashboard host.
///
/// Every key is optional in the TOML source; missing keys take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without a trailing slash.
    pub api_base_url: String,

    /// Per-request timeout applied by the transport.
    pub request_timeout_secs: u64,

    /// Portfolio dashboard refresh period.
    pub dashboard_poll_secs: u64,

    /// Market-data view refresh period.
    pub market_poll_secs: u64,

    /// Leaderboard refresh period.
    pub leaderboard_poll_secs: u64,

    /// Window requested from `/dashboard/balance-history`.
    pub balance_history_days: u32,

    /// Where the encrypted session lives. `None` keeps the session in memory only.
    pub session_file: Option<PathBuf>,

    /// Passphrase the session file key is derived from.
    pub session_passphrase: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 30,
            dashboard_poll_secs: 30,
            market_poll_secs: 60,
            leaderboard_poll_secs: 300,
            balance_history_days: 7,
            session_file: None,
            session_passphrase: None,
        }
    }
}

impl ClientConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, CoreError> {
        let mut config: ClientConfig = toml::from_str(source)?;
        config.api_base_url = config.api_base_url.trim().trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.api_base_url.trim().is_empty() {
            return Err(CoreError::Config("api_base_url must not be empty".into()));
        }
        for (name, secs) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("dashboard_poll_secs", self.dashboard_poll_secs),
            ("market_poll_secs", self.market_poll_secs),
            ("leaderboard_poll_secs", self.leaderboard_poll_secs),
        ] {
            if secs == 0 {
                return Err(CoreError::Config(format!("{name} must be greater than zero")));
            }
        }
        if self.balance_history_days == 0 {
            return Err(CoreError::Config(
                "balance_history_days must be greater than zero".into(),
            ));
        }
        if self.session_file.is_some()
            && self.session_passphrase.as_deref().unwrap_or("").is_empty()
        {
            return Err(CoreError::Config(
                "session_passphrase is required when session_file is set".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn dashboard_poll_period(&self) -> Duration {
        Duration::from_secs(self.dashboard_poll_secs)
    }

    pub fn market_poll_period(&self) -> Duration {
        Duration::from_secs(self.market_poll_secs)
    }

    pub fn leaderboard_poll_period(&self) -> Duration {
        Duration::from_secs(self.leaderboard_poll_secs)
    }
}
