use std::sync::Arc;

use crate::services::dashboard_service::{DashboardEngine, InitReport};
use crate::services::leaderboard_service::LeaderboardEngine;
use crate::services::market_service::MarketEngine;
use crate::services::polling::PollHandle;

/// An engine that can be torn down with its view.
pub trait ViewEngine: Send + Sync + 'static {
    fn close(&self);
}

impl ViewEngine for DashboardEngine {
    fn close(&self) {
        DashboardEngine::close(self);
    }
}

impl ViewEngine for MarketEngine {
    fn close(&self) {
        MarketEngine::close(self);
    }
}

impl ViewEngine for LeaderboardEngine {
    fn close(&self) {
        LeaderboardEngine::close(self);
    }
}

/// A mounted view: its engine plus the poller keeping it fresh.
///
/// Closing (or dropping) stops the timer and marks the engine closed, so
/// responses still in flight are discarded.
pub struct View<E: ViewEngine> {
    engine: Arc<E>,
    poller: Option<PollHandle>,
}

impl<E: ViewEngine> std::fmt::Debug for View<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("engine", &std::any::type_name::<E>())
            .field("poller", &self.poller)
            .finish()
    }
}

pub type DashboardView = View<DashboardEngine>;
pub type MarketView = View<MarketEngine>;
pub type LeaderboardView = View<LeaderboardEngine>;

impl<E: ViewEngine> View<E> {
    pub fn new(engine: Arc<E>, poller: Option<PollHandle>) -> Self {
        Self { engine, poller }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    pub fn poller(&self) -> Option<&PollHandle> {
        self.poller.as_ref()
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(PollHandle::is_running)
    }

    pub fn close(self) {
        drop(self);
    }

    fn shutdown(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
        self.engine.close();
    }
}

impl<E: ViewEngine> Drop for View<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Dashboard view together with how its first render was produced.
#[derive(Debug)]
pub struct OpenedDashboard {
    pub view: DashboardView,
    pub init: InitReport,
}
