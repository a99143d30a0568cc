pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;
pub mod views;

use std::sync::Arc;
use tracing::info;

use api::{ApiClient, Navigator, ReqwestTransport, Transport};
use config::ClientConfig;
use errors::CoreError;
use models::session::UserProfile;
use services::{
    auth_service::AuthService, dashboard_service::DashboardEngine,
    leaderboard_service::LeaderboardEngine, market_service::MarketEngine, polling::Poller,
};
use session::{EncryptedFilePersistence, SessionStore};
use views::{LeaderboardView, MarketView, OpenedDashboard, View};

/// Main entry point for the dashboard client core.
/// Holds the session and the authorized API client every view shares.
#[must_use]
pub struct TradingDashboard {
    config: ClientConfig,
    api: ApiClient,
    auth: AuthService,
}

impl std::fmt::Debug for TradingDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingDashboard")
            .field("api_base_url", &self.config.api_base_url)
            .field("session", self.api.session())
            .finish()
    }
}

impl TradingDashboard {
    /// Build against the real backend over HTTP.
    pub fn connect(config: ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, CoreError> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.api_base_url.clone(), config.request_timeout())?;
        Self::new(config, Arc::new(transport), navigator)
    }

    /// Build with any transport. The session is restored from the configured
    /// session file, or kept in memory when none is configured.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let session = match (&config.session_file, &config.session_passphrase) {
            (Some(path), Some(passphrase)) => SessionStore::restore(Arc::new(
                EncryptedFilePersistence::new(path.clone(), passphrase.clone()),
            )),
            _ => SessionStore::in_memory(),
        };
        Ok(Self::with_session(config, transport, navigator, session))
    }

    /// Build around an existing session store.
    pub fn with_session(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
        session: SessionStore,
    ) -> Self {
        let api = ApiClient::new(transport, session, navigator);
        let auth = AuthService::new(api.clone());
        Self { config, api, auth }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    // ── Auth ────────────────────────────────────────────────────────

    pub async fn login_with_google(&self, credential: &str) -> Result<UserProfile, CoreError> {
        self.auth.login_with_google(credential).await
    }

    pub async fn restore_session(&self) -> Result<Option<UserProfile>, CoreError> {
        self.auth.restore().await
    }

    pub fn logout(&self) {
        self.auth.logout();
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    // ── Views ───────────────────────────────────────────────────────

    /// Mount the portfolio dashboard. Polling starts only once at least
    /// one broker connection is known.
    pub async fn open_dashboard(&self) -> Result<OpenedDashboard, CoreError> {
        let engine = Arc::new(DashboardEngine::new(
            self.api.clone(),
            self.config.balance_history_days,
        ));
        let init = engine.initialize().await?;

        let poller = engine.has_brokers().then(|| {
            let polled = Arc::clone(&engine);
            Poller::start(
                self.config.dashboard_poll_period(),
                engine.lifetime().child_token(),
                move || {
                    let engine = Arc::clone(&polled);
                    async move {
                        let _ = engine.refresh(true).await;
                    }
                },
            )
        });
        info!(outcome = ?init.outcome, polling = poller.is_some(), "Dashboard opened");

        Ok(OpenedDashboard {
            view: View::new(engine, poller),
            init,
        })
    }

    pub async fn open_market(&self) -> Result<MarketView, CoreError> {
        let engine = Arc::new(MarketEngine::new(self.api.clone()));
        engine.initialize().await?;

        let polled = Arc::clone(&engine);
        let poller = Poller::start(
            self.config.market_poll_period(),
            engine.lifetime().child_token(),
            move || {
                let engine = Arc::clone(&polled);
                async move {
                    let _ = engine.refresh(true).await;
                }
            },
        );
        Ok(View::new(engine, Some(poller)))
    }

    pub async fn open_leaderboard(&self) -> Result<LeaderboardView, CoreError> {
        let engine = Arc::new(LeaderboardEngine::new(self.api.clone()));
        if let Err(e @ (CoreError::Unauthorized | CoreError::ViewClosed)) = engine.load().await {
            return Err(e);
        }

        let polled = Arc::clone(&engine);
        let poller = Poller::start(
            self.config.leaderboard_poll_period(),
            engine.lifetime().child_token(),
            move || {
                let engine = Arc::clone(&polled);
                async move {
                    let _ = engine.refresh(true).await;
                }
            },
        );
        Ok(View::new(engine, Some(poller)))
    }
}
