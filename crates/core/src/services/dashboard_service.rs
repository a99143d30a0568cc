//! Cache-first portfolio dashboard.
//!
//! A view opens on the backend's cached snapshot when one exists and
//! reconciles with a live refresh in the background. The live refresh
//! replaces every snapshot field outright, except the balance series and
//! trade markers, which only change when their normalized key changes.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::errors::CoreError;
use crate::models::balance::{BalanceHistoryPoint, BalanceHistoryResponse, TradeMarker};
use crate::models::broker::BrokerConnection;
use crate::models::chart::ChartPoint;
use crate::models::dashboard::{
    ApiLog, BrokerBalance, DashboardSnapshot, Position, RefreshDashboardResponse, Trade,
    TraderSummary,
};
use crate::models::execution::{ExecuteRequest, ExecuteResponse};

use super::annotation::annotate;
use super::change_cell::ChangeCell;
use super::lifetime::ViewLifetime;

/// Everything the dashboard renders.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub broker_connections: Vec<BrokerConnection>,
    pub broker_balances: Vec<BrokerBalance>,
    pub positions: Vec<Position>,
    pub trades: Vec<Trade>,
    pub api_logs: Vec<ApiLog>,
    pub traders: Vec<TraderSummary>,
    pub balance_history: ChangeCell<Vec<BalanceHistoryPoint>>,
    pub trade_markers: ChangeCell<Vec<TradeMarker>>,
    /// Annotated series; rebuilt only when one of the two cells above changes.
    pub chart: Arc<Vec<ChartPoint>>,
    /// Initial spinner.
    pub loading: bool,
    /// A user-initiated refresh is in flight.
    pub refreshing: bool,
    /// Dismissable banner for foreground failures.
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_execution: Option<ExecuteResponse>,
}

/// How `initialize` got the view to its first render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Cached snapshot applied; live refresh continues in the background.
    Cached,
    /// No cache; a blocking refresh ran before the spinner stopped.
    Refreshed,
    /// No cache and no broker connected. Nothing to fetch yet.
    NoBrokers,
}

#[derive(Debug)]
pub struct InitReport {
    pub outcome: InitOutcome,
    /// The background refresh spawned on the cached path.
    pub background: Option<JoinHandle<()>>,
}

pub struct DashboardEngine {
    api: ApiClient,
    lifetime: ViewLifetime,
    history_days: u32,
    state: Mutex<DashboardState>,
    /// Foreground refreshes in flight; `refreshing` mirrors `> 0`.
    foreground_in_flight: Mutex<u32>,
}

impl std::fmt::Debug for DashboardEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("DashboardEngine")
            .field("alive", &self.lifetime.is_alive())
            .field("loading", &state.loading)
            .field("brokers", &state.broker_connections.len())
            .field("history_points", &state.balance_history.len())
            .finish()
    }
}

impl DashboardEngine {
    pub fn new(api: ApiClient, history_days: u32) -> Self {
        Self {
            api,
            lifetime: ViewLifetime::new(),
            history_days,
            state: Mutex::new(DashboardState {
                loading: true,
                ..DashboardState::default()
            }),
            foreground_in_flight: Mutex::new(0),
        }
    }

    pub fn lifetime(&self) -> &ViewLifetime {
        &self.lifetime
    }

    // ── Initialization ──────────────────────────────────────────────

    /// Bring the view to its first render.
    ///
    /// Order: broker connections, then the cached snapshot, then either a
    /// background refresh (cache hit), a blocking refresh (cache miss with
    /// brokers) or nothing (no brokers).
    pub async fn initialize(self: &Arc<Self>) -> Result<InitReport, CoreError> {
        let connections = match self.api.broker_connections().await {
            Ok(resp) => resp.connections,
            Err(e) if e.is_unauthorized() => return Err(e),
            Err(e) => {
                warn!(error = %e, "Failed to load broker connections");
                Vec::new()
            }
        };
        let has_brokers = !connections.is_empty();
        self.update(|s| s.broker_connections = connections)?;

        if self.load_cached().await?.is_some() {
            self.update(|s| s.loading = false)?;
            debug!("Dashboard rendered from cache");
            return Ok(InitReport {
                outcome: InitOutcome::Cached,
                background: Some(self.spawn_background_refresh()),
            });
        }

        if has_brokers {
            // A failed first refresh still ends the spinner; the banner shows why.
            if let Err(e @ (CoreError::Unauthorized | CoreError::ViewClosed)) = self.refresh(false).await {
                return Err(e);
            }
            self.update(|s| s.loading = false)?;
            return Ok(InitReport {
                outcome: InitOutcome::Refreshed,
                background: None,
            });
        }

        self.update(|s| s.loading = false)?;
        info!("No broker connected, skipping dashboard refresh");
        Ok(InitReport {
            outcome: InitOutcome::NoBrokers,
            background: None,
        })
    }

    /// Read the backend's cached snapshot and apply it if present.
    ///
    /// Failures other than 401 are silent: a live refresh follows anyway.
    pub async fn load_cached(&self) -> Result<Option<DashboardSnapshot>, CoreError> {
        let result = self.api.dashboard_cached().await;
        self.lifetime.ensure_alive()?;
        match result {
            Ok(resp) => match resp.into_snapshot() {
                Some((snapshot, updated_at)) => {
                    self.apply_snapshot(snapshot.clone(), updated_at)?;
                    Ok(Some(snapshot))
                }
                None => Ok(None),
            },
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                debug!(error = %e, "No cached dashboard");
                Ok(None)
            }
        }
    }

    // ── Refresh ─────────────────────────────────────────────────────

    /// Ask the backend to recompute the snapshot and apply it.
    ///
    /// The balance series is fetched alongside as an independent call; its
    /// failure never fails the refresh. A background refresh swallows its
    /// own failure (logged only) and returns `Ok`. A foreground refresh
    /// sets `refreshing` while running and shows failures in the banner.
    /// Displayed data is never cleared on failure.
    pub async fn refresh(&self, background: bool) -> Result<(), CoreError> {
        if !background {
            self.begin_foreground()?;
        }

        let (main, history) = tokio::join!(
            self.api.dashboard_refresh(),
            self.api.balance_history(self.history_days)
        );

        let outcome = self.reconcile(main, history, background);
        if !background {
            self.end_foreground();
        }
        outcome
    }

    fn reconcile(
        &self,
        main: Result<RefreshDashboardResponse, CoreError>,
        history: Result<BalanceHistoryResponse, CoreError>,
        background: bool,
    ) -> Result<(), CoreError> {
        self.lifetime.ensure_alive()?;

        if main.as_ref().err().is_some_and(CoreError::is_unauthorized)
            || history.as_ref().err().is_some_and(CoreError::is_unauthorized)
        {
            return Err(CoreError::Unauthorized);
        }

        match history {
            Ok(resp) => {
                self.apply_balance_history(resp.history, resp.trades)?;
            }
            Err(e) => warn!(error = %e, "Balance history fetch failed, keeping previous series"),
        }

        let failure = match main {
            Ok(RefreshDashboardResponse {
                success: true,
                data: Some(snapshot),
                ..
            }) => {
                self.apply_snapshot(snapshot, Some(Utc::now()))?;
                return Ok(());
            }
            Ok(resp) => CoreError::Api {
                endpoint: "/dashboard/refresh".into(),
                status: 200,
                message: resp.error.unwrap_or_else(|| "Refresh returned no data".into()),
            },
            Err(e) => e,
        };

        if background {
            warn!(error = %failure, "Background dashboard refresh failed");
            Ok(())
        } else {
            let message = format!("Failed to refresh dashboard: {failure}");
            self.update(|s| s.error = Some(message))?;
            Err(failure)
        }
    }

    /// Spawn `refresh(true)` detached. Used by the cached init path and the poller.
    pub fn spawn_background_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            match engine.refresh(true).await {
                Ok(()) => {}
                Err(CoreError::ViewClosed) => debug!("Dashboard closed, refresh discarded"),
                Err(e) => debug!(error = %e, "Background refresh ended"),
            }
        })
    }

    /// Refetch only the balance series and trade markers.
    pub async fn refresh_balance_history(&self) -> Result<bool, CoreError> {
        let resp = self.api.balance_history(self.history_days).await;
        self.lifetime.ensure_alive()?;
        let resp = resp?;
        self.apply_balance_history(resp.history, resp.trades)
    }

    // ── Apply ───────────────────────────────────────────────────────

    /// Replace every snapshot field; the embedded balance series, if any,
    /// only when its normalized key differs.
    pub fn apply_snapshot(
        &self,
        snapshot: DashboardSnapshot,
        updated_at: Option<DateTime<Utc>>,
    ) -> Result<(), CoreError> {
        self.update(|s| {
            s.broker_balances = snapshot.broker_balances;
            s.positions = snapshot.positions;
            s.trades = snapshot.trades;
            s.api_logs = snapshot.api_logs;
            s.traders = snapshot.traders;
            if updated_at.is_some() {
                s.updated_at = updated_at;
            }
            if let Some(history) = snapshot.balance_history {
                if s.balance_history.replace_if_changed(history) {
                    rebuild_chart(s);
                }
            }
        })
    }

    /// Returns `true` if either the series or the markers changed.
    pub fn apply_balance_history(
        &self,
        history: Vec<BalanceHistoryPoint>,
        markers: Vec<TradeMarker>,
    ) -> Result<bool, CoreError> {
        self.update(|s| {
            let history_changed = s.balance_history.replace_if_changed(history);
            let markers_changed = s.trade_markers.replace_if_changed(markers);
            let changed = history_changed || markers_changed;
            if changed {
                rebuild_chart(s);
            }
            changed
        })
    }

    // ── Execution ───────────────────────────────────────────────────

    /// Run the user's trading agents now, then refresh in the foreground.
    pub async fn execute_trades(&self, request: ExecuteRequest) -> Result<ExecuteResponse, CoreError> {
        self.begin_foreground()?;
        let result = self.api.execute_trades(&request).await;
        self.end_foreground();
        self.lifetime.ensure_alive()?;

        let response = match result {
            Ok(response) => response,
            Err(e) if e.is_unauthorized() => return Err(e),
            Err(e) => {
                let message = format!("Trade execution failed: {e}");
                self.update(|s| s.error = Some(message))?;
                return Err(e);
            }
        };
        info!(
            succeeded = response.succeeded(),
            failed = response.failed(),
            "Trade execution finished"
        );
        self.update(|s| s.last_execution = Some(response.clone()))?;

        match self.refresh(false).await {
            Ok(()) | Err(CoreError::Api { .. }) | Err(CoreError::Network(_)) => Ok(response),
            Err(e) => Err(e),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn state(&self) -> DashboardState {
        self.lock().clone()
    }

    #[must_use]
    pub fn chart_points(&self) -> Arc<Vec<ChartPoint>> {
        Arc::clone(&self.lock().chart)
    }

    #[must_use]
    pub fn has_brokers(&self) -> bool {
        !self.lock().broker_connections.is_empty()
    }

    pub fn dismiss_error(&self) {
        self.lock().error = None;
    }

    /// Tear the view down. Responses arriving later are discarded.
    pub fn close(&self) {
        self.lifetime.close();
    }

    // ── Internal ────────────────────────────────────────────────────

    fn begin_foreground(&self) -> Result<(), CoreError> {
        *self.counter() += 1;
        self.update(|s| {
            s.refreshing = true;
            s.error = None;
        })
    }

    fn end_foreground(&self) {
        let remaining = {
            let mut n = self.counter();
            *n = n.saturating_sub(1);
            *n
        };
        if remaining == 0 {
            self.lock().refreshing = false;
        }
    }

    /// Mutate state if the view is still mounted.
    fn update<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> Result<R, CoreError> {
        self.lifetime.ensure_alive()?;
        Ok(f(&mut self.lock()))
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn counter(&self) -> MutexGuard<'_, u32> {
        self.foreground_in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn rebuild_chart(state: &mut DashboardState) {
    state.chart = Arc::new(annotate(&state.balance_history, &state.trade_markers));
}
