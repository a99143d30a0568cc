//! Authorized access to the backend.
//!
//! Every outgoing call goes through `ApiClient::execute`, which attaches
//! the bearer token and owns the single 401 handler: tear the session
//! down, then ask the host to navigate to the landing route. Views never
//! check for 401 themselves.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::balance::BalanceHistoryResponse;
use crate::models::broker::BrokerConnectionsResponse;
use crate::models::dashboard::{CachedDashboardResponse, RefreshDashboardResponse};
use crate::models::execution::{ExecuteRequest, ExecuteResponse};
use crate::models::leaderboard::LeaderboardResponse;
use crate::models::market::MarketResponse;
use crate::models::session::{AuthResponse, GoogleAuthRequest, MeResponse, UserProfile};
use crate::session::SessionStore;

use super::navigator::{Navigator, LANDING_ROUTE};
use super::transport::{ApiRequest, Method, Transport};

/// Longest slice of a non-JSON error body kept in `CoreError::Api`.
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Required,
    Anonymous,
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // ── Dashboard ───────────────────────────────────────────────────

    pub async fn dashboard_cached(&self) -> Result<CachedDashboardResponse, CoreError> {
        self.fetch(ApiRequest::new(Method::Get, "/dashboard/cached")).await
    }

    pub async fn dashboard_refresh(&self) -> Result<RefreshDashboardResponse, CoreError> {
        self.fetch(ApiRequest::new(Method::Post, "/dashboard/refresh")).await
    }

    pub async fn balance_history(&self, days: u32) -> Result<BalanceHistoryResponse, CoreError> {
        self.fetch(ApiRequest::new(Method::Get, "/dashboard/balance-history").query("days", days))
            .await
    }

    pub async fn execute_trades(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, CoreError> {
        let body = serde_json::to_value(request)
            .map_err(|e| CoreError::Serialization(format!("Failed to encode execute request: {e}")))?;
        self.fetch(ApiRequest::new(Method::Post, "/dashboard/execute").json(body)).await
    }

    // ── Brokers ─────────────────────────────────────────────────────

    pub async fn broker_connections(&self) -> Result<BrokerConnectionsResponse, CoreError> {
        self.fetch(ApiRequest::new(Method::Get, "/brokers/connections")).await
    }

    // ── Market data ─────────────────────────────────────────────────

    pub async fn market_cached(&self) -> Result<MarketResponse, CoreError> {
        self.fetch(ApiRequest::new(Method::Get, "/api/market/cached")).await
    }

    pub async fn market_refresh(&self) -> Result<MarketResponse, CoreError> {
        self.fetch(ApiRequest::new(Method::Post, "/api/market/refresh")).await
    }

    // ── Leaderboard ─────────────────────────────────────────────────

    pub async fn leaderboard(&self) -> Result<LeaderboardResponse, CoreError> {
        self.fetch(ApiRequest::new(Method::Get, "/api/leaderboard")).await
    }

    // ── Auth ────────────────────────────────────────────────────────

    /// Exchange an external Google credential for a backend bearer token.
    /// Sent without a token; a 401 here is a rejected credential, not an expired session.
    pub async fn auth_google(&self, credential: &str) -> Result<AuthResponse, CoreError> {
        let body = serde_json::to_value(GoogleAuthRequest {
            credential: credential.to_string(),
        })
        .map_err(|e| CoreError::Serialization(format!("Failed to encode auth request: {e}")))?;
        self.call(ApiRequest::new(Method::Post, "/auth/google").json(body), Auth::Anonymous)
            .await
    }

    pub async fn auth_me(&self) -> Result<UserProfile, CoreError> {
        let me: MeResponse =
            self.fetch(ApiRequest::new(Method::Get, "/auth/me")).await?;
        Ok(me.into_profile())
    }

    // ── Interceptor ─────────────────────────────────────────────────

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, CoreError> {
        self.call(request, Auth::Required).await
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest, auth: Auth) -> Result<T, CoreError> {
        let path = request.path.clone();
        let body = self.execute(request, auth).await?;
        serde_json::from_slice(&body).map_err(|e| {
            CoreError::Deserialization(format!("Failed to parse response from {path}: {e}"))
        })
    }

    /// Send one request and return the 2xx body.
    async fn execute(&self, mut request: ApiRequest, auth: Auth) -> Result<Vec<u8>, CoreError> {
        let token = match auth {
            Auth::Anonymous => None,
            Auth::Required => Some(
                self.session
                    .token()
                    .ok_or_else(|| CoreError::NotAuthenticated(request.path.clone()))?,
            ),
        };
        request.bearer = token.clone();

        let method = request.method;
        let path = request.path.clone();
        debug!(%method, path = %path, request_id = %request.request_id, "Sending request");

        let response = self.transport.send(request).await?;

        if response.status == 401 {
            if let Some(token) = token {
                self.handle_unauthorized(&path, &token);
            }
            return Err(CoreError::Unauthorized);
        }
        if !response.is_success() {
            let message = error_message(&response.body);
            warn!(%method, path = %path, status = response.status, %message, "Backend returned error");
            return Err(CoreError::Api {
                endpoint: path,
                status: response.status,
                message,
            });
        }
        Ok(response.body)
    }

    fn handle_unauthorized(&self, path: &str, token: &str) {
        if self.session.invalidate_token(token) {
            info!(path, "Token rejected by backend, redirecting to landing");
            self.navigator.navigate(LANDING_ROUTE);
        } else {
            debug!(path, "Token already invalidated");
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "error", alias = "message")]
    detail: serde_json::Value,
}

/// Pull a human-readable message out of an error response.
fn error_message(body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        return match parsed.detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
    }
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.chars().count() > MAX_ERROR_BODY {
        let cut: String = trimmed.chars().take(MAX_ERROR_BODY).collect();
        format!("{cut}…")
    } else {
        trimmed.to_string()
    }
}
