use serde::{Deserialize, Serialize};

/// Profile of the signed-in user, as returned by `/auth/google` and `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, alias = "avatarUrl", alias = "picture")]
    pub avatar_url: Option<String>,
}

/// Current identity plus bearer token.
///
/// A token is only ever present after a successful exchange with the
/// backend; `Session::default()` is the unauthenticated state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: Option<UserProfile>) -> Self {
        Self {
            token: Some(token.into()),
            user,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Body of `POST /auth/google`.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleAuthRequest {
    pub credential: String,
}

/// Response of `POST /auth/google`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: UserProfile,
}

/// Response of `GET /auth/me`. Some deployments wrap the profile in `user`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MeResponse {
    Wrapped { user: UserProfile },
    Bare(UserProfile),
}

impl MeResponse {
    pub fn into_profile(self) -> UserProfile {
        match self {
            MeResponse::Wrapped { user } => user,
            MeResponse::Bare(user) => user,
        }
    }
}
