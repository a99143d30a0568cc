use std::sync::{Mutex, MutexGuard};
use tracing::warn;

use crate::api::ApiClient;
use crate::errors::CoreError;
use crate::models::leaderboard::LeaderboardEntry;

use super::lifetime::ViewLifetime;

#[derive(Debug, Clone, Default)]
pub struct LeaderboardState {
    pub entries: Vec<LeaderboardEntry>,
    pub current_user: Option<LeaderboardEntry>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Read-only ranking view. Ranking is computed by the backend.
pub struct LeaderboardEngine {
    api: ApiClient,
    lifetime: ViewLifetime,
    state: Mutex<LeaderboardState>,
}

impl LeaderboardEngine {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            lifetime: ViewLifetime::new(),
            state: Mutex::new(LeaderboardState {
                loading: true,
                ..LeaderboardState::default()
            }),
        }
    }

    pub fn lifetime(&self) -> &ViewLifetime {
        &self.lifetime
    }

    /// First load, spinner shown until it completes.
    pub async fn load(&self) -> Result<(), CoreError> {
        let result = self.refresh(false).await;
        if self.lifetime.is_alive() {
            self.lock().loading = false;
        }
        result
    }

    pub async fn refresh(&self, background: bool) -> Result<(), CoreError> {
        let result = self.api.leaderboard().await;
        self.lifetime.ensure_alive()?;
        match result {
            Ok(resp) => {
                let mut s = self.lock();
                s.entries = resp.leaderboard;
                s.current_user = resp.current_user;
                s.error = None;
                Ok(())
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) if background => {
                warn!(error = %e, "Background leaderboard refresh failed");
                Ok(())
            }
            Err(e) => {
                self.lock().error = Some(format!("Failed to load leaderboard: {e}"));
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> LeaderboardState {
        self.lock().clone()
    }

    pub fn close(&self) {
        self.lifetime.close();
    }

    fn lock(&self) -> MutexGuard<'_, LeaderboardState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
