use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::errors::CoreError;
use crate::models::market::{HistoryData, MarketOverview, MarketResponse};

use super::change_cell::ChangeCell;
use super::lifetime::ViewLifetime;

#[derive(Debug, Clone, Default)]
pub struct MarketState {
    pub overview: ChangeCell<Vec<MarketOverview>>,
    pub history: ChangeCell<HistoryData>,
    pub updated_at: Option<DateTime<Utc>>,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<String>,
}

/// Market-data view: same cache-first flow as the dashboard, with no
/// broker precondition. Overview and history are only swapped when their
/// serialized form changes.
pub struct MarketEngine {
    api: ApiClient,
    lifetime: ViewLifetime,
    state: Mutex<MarketState>,
    /// Foreground refreshes in flight; `refreshing` mirrors `> 0`.
    foreground_in_flight: Mutex<u32>,
}

impl MarketEngine {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            lifetime: ViewLifetime::new(),
            state: Mutex::new(MarketState {
                loading: true,
                ..MarketState::default()
            }),
            foreground_in_flight: Mutex::new(0),
        }
    }

    pub fn lifetime(&self) -> &ViewLifetime {
        &self.lifetime
    }

    /// Cached data first; refresh in the background on a hit, block on a miss.
    /// Returns the background task when one was spawned.
    pub async fn initialize(self: &Arc<Self>) -> Result<Option<JoinHandle<()>>, CoreError> {
        if self.load_cached().await? {
            self.update(|s| s.loading = false)?;
            let engine = Arc::clone(self);
            return Ok(Some(tokio::spawn(async move {
                if let Err(e) = engine.refresh(true).await {
                    debug!(error = %e, "Background market refresh ended");
                }
            })));
        }

        if let Err(e @ (CoreError::Unauthorized | CoreError::ViewClosed)) = self.refresh(false).await {
            return Err(e);
        }
        self.update(|s| s.loading = false)?;
        Ok(None)
    }

    /// Returns `true` if a non-empty cached payload was applied.
    pub async fn load_cached(&self) -> Result<bool, CoreError> {
        let result = self.api.market_cached().await;
        self.lifetime.ensure_alive()?;
        match result {
            Ok(resp) if !resp.is_empty() => {
                self.apply(resp)?;
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                debug!(error = %e, "No cached market data");
                Ok(false)
            }
        }
    }

    pub async fn refresh(&self, background: bool) -> Result<(), CoreError> {
        if !background {
            self.begin_foreground()?;
        }
        let result = self.api.market_refresh().await;
        if !background {
            self.end_foreground();
        }
        self.lifetime.ensure_alive()?;

        match result {
            Ok(resp) => self.apply(resp).map(|_| ()),
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) if background => {
                warn!(error = %e, "Background market refresh failed");
                Ok(())
            }
            Err(e) => {
                let message = format!("Failed to refresh market data: {e}");
                self.update(|s| s.error = Some(message))?;
                Err(e)
            }
        }
    }

    /// Returns `true` if overview or history changed.
    pub fn apply(&self, resp: MarketResponse) -> Result<bool, CoreError> {
        self.update(|s| {
            let overview_changed = s.overview.replace_if_changed(resp.overview);
            let history_changed = s.history.replace_if_changed(resp.history);
            if resp.updated_at.is_some() {
                s.updated_at = resp.updated_at;
            }
            overview_changed || history_changed
        })
    }

    #[must_use]
    pub fn state(&self) -> MarketState {
        self.lock().clone()
    }

    pub fn dismiss_error(&self) {
        self.lock().error = None;
    }

    pub fn close(&self) {
        self.lifetime.close();
    }

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

    fn update<R>(&self, f: impl FnOnce(&mut MarketState) -> R) -> Result<R, CoreError> {
        self.lifetime.ensure_alive()?;
        Ok(f(&mut self.lock()))
    }

    fn lock(&self) -> MutexGuard<'_, MarketState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn counter(&self) -> MutexGuard<'_, u32> {
        self.foreground_in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}
