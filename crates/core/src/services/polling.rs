//! Fixed-period background refresh bound to a view's lifetime.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default refresh period of the portfolio dashboard.
pub const DASHBOARD_POLL_PERIOD: Duration = Duration::from_secs(30);
/// Default refresh period of the market-data view.
pub const MARKET_POLL_PERIOD: Duration = Duration::from_secs(60);
/// Default refresh period of the leaderboard.
pub const LEADERBOARD_POLL_PERIOD: Duration = Duration::from_secs(300);

/// Handle to a running poller. Stopping it (or dropping it) cancels the
/// timer; refreshes already spawned run to completion.
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
    period: Duration,
}

impl PollHandle {
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Number of refreshes fired so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct Poller;

impl Poller {
    /// Call `task` every `period`, first one period after start.
    ///
    /// Each tick spawns its own task, so a refresh slower than the period
    /// overlaps the next one instead of delaying it. The loop exits when
    /// `cancel` fires or the handle is stopped.
    pub fn start<F, Fut>(period: Duration, cancel: CancellationToken, task: F) -> PollHandle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let ticks = Arc::new(AtomicU64::new(0));
        let loop_cancel = cancel.clone();
        let loop_ticks = Arc::clone(&ticks);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = loop_cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let n = loop_ticks.fetch_add(1, Ordering::Relaxed) + 1;
                        debug!(tick = n, ?period, "Poll tick");
                        tokio::spawn(task());
                    }
                }
            }
            debug!(?period, "Poller stopped");
        });

        PollHandle {
            cancel,
            task: Some(handle),
            ticks,
            period,
        }
    }
}
