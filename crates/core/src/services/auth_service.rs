use tracing::{info, warn};

use crate::api::ApiClient;
use crate::errors::CoreError;
use crate::models::session::UserProfile;

/// Login, session restore and logout against `/auth/*`.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange a Google ID credential for a bearer token and store the session.
    pub async fn login_with_google(&self, credential: &str) -> Result<UserProfile, CoreError> {
        if credential.trim().is_empty() {
            return Err(CoreError::NotAuthenticated("empty Google credential".into()));
        }
        let resp = self.api.auth_google(credential).await?;
        info!(email = %resp.user.email, "Signed in");
        self.api.session().set(resp.token, Some(resp.user.clone()));
        Ok(resp.user)
    }

    /// Validate a persisted token with `/auth/me`.
    ///
    /// `Ok(None)` means there is no usable session (none stored, or the
    /// backend rejected it and the interceptor tore it down). Transport
    /// failures keep the last-known profile so the app can start offline.
    pub async fn restore(&self) -> Result<Option<UserProfile>, CoreError> {
        let session = self.api.session();
        if !session.is_authenticated() {
            return Ok(None);
        }
        match self.api.auth_me().await {
            Ok(profile) => {
                session.update_user(profile.clone());
                Ok(Some(profile))
            }
            Err(CoreError::Unauthorized) => Ok(None),
            Err(e @ (CoreError::Network(_) | CoreError::Api { .. })) => {
                warn!(error = %e, "Could not validate session, using stored profile");
                Ok(session.user())
            }
            Err(e) => Err(e),
        }
    }

    pub fn logout(&self) {
        self.api.session().logout();
        info!("Signed out");
    }
}
