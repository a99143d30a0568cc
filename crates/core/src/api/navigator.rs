use tokio::sync::mpsc;
use tracing::info;

/// Route of the unauthenticated landing page.
pub const LANDING_ROUTE: &str = "/";

/// Hook through which the core asks the host UI to change route.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Only logs. For headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "Navigation requested");
    }
}

/// Forwards routes over a channel to the host's UI loop.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: &str) {
        // Receiver gone means the UI already shut down.
        let _ = self.tx.send(route.to_string());
    }
}
