use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::session::{Session, UserProfile};

use super::persistence::{MemoryPersistence, SessionPersistence};

/// Shared holder of the current session.
///
/// Every mutation is written through to the persistence backend. Write
/// failures are logged, not returned: the in-memory state is authoritative
/// for the running process.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<Mutex<Session>>,
    persistence: Arc<dyn SessionPersistence>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.snapshot();
        f.debug_struct("SessionStore")
            .field("authenticated", &session.is_authenticated())
            .field("user", &session.user.as_ref().map(|u| u.email.as_str()))
            .finish()
    }
}

impl SessionStore {
    /// Empty, memory-only store.
    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(Mutex::new(Session::default())),
            persistence: Arc::new(MemoryPersistence::new()),
        }
    }

    /// Rebuild the store from whatever the backend persisted.
    /// An unreadable file is treated as logged out.
    pub fn restore(persistence: Arc<dyn SessionPersistence>) -> Self {
        let session = match persistence.load() {
            Ok(Some(session)) => session,
            Ok(None) => Session::default(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable persisted session");
                if let Err(e) = persistence.clear() {
                    warn!(error = %e, "Failed to clear unreadable session");
                }
                Session::default()
            }
        };
        Self {
            state: Arc::new(Mutex::new(session)),
            persistence,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.lock().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    /// Install a freshly exchanged token and profile.
    pub fn set(&self, token: impl Into<String>, user: Option<UserProfile>) {
        let mut guard = self.lock();
        *guard = Session::new(token, user);
        self.persist(Some(&*guard));
    }

    /// Replace the stored profile, keeping the token. No-op when logged out.
    pub fn update_user(&self, user: UserProfile) {
        let mut guard = self.lock();
        if !guard.is_authenticated() {
            return;
        }
        guard.user = Some(user);
        self.persist(Some(&*guard));
    }

    /// Tear the session down after the backend rejected its token.
    ///
    /// Returns `true` only for the call that actually removed a token, so
    /// concurrent 401s produce a single teardown.
    pub fn invalidate(&self) -> bool {
        let mut guard = self.lock();
        if guard.token.is_none() {
            return false;
        }
        *guard = Session::default();
        info!("Session invalidated");
        self.persist(None);
        true
    }

    /// Like [`invalidate`](Self::invalidate), but only if `token` is still the
    /// current one. A 401 for a token that has since been replaced by a new
    /// login must not log the new session out.
    pub fn invalidate_token(&self, token: &str) -> bool {
        let mut guard = self.lock();
        if guard.token.as_deref() != Some(token) {
            return false;
        }
        *guard = Session::default();
        info!("Session invalidated after rejected token");
        self.persist(None);
        true
    }

    /// Explicit, user-initiated logout.
    pub fn logout(&self) {
        let mut guard = self.lock();
        *guard = Session::default();
        self.persist(None);
    }

    /// Write-through to the backend. Callers hold the state lock, so the
    /// backend sees mutations in the same order as memory does.
    fn persist(&self, session: Option<&Session>) {
        let result: Result<(), CoreError> = match session {
            Some(s) => self.persistence.save(s),
            None => self.persistence.clear(),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session state");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
