use tokio_util::sync::CancellationToken;

use crate::errors::CoreError;

/// Liveness of a mounted view.
///
/// Engines check this after every await and drop the response once the
/// view is closed. In-flight requests are not aborted.
#[derive(Debug, Clone, Default)]
pub struct ViewLifetime {
    token: CancellationToken,
}

impl ViewLifetime {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn ensure_alive(&self) -> Result<(), CoreError> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(CoreError::ViewClosed)
        }
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    /// Token that is cancelled together with this view. Pollers hang off it.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }
}
