//! Authentication response types.

use serde::Serialize;

use crate::service::auth::{AuthSession, Profile};

/// Public projection of an account.
///
/// Credential fields never appear here.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Avatar URL or data URI, empty when the account has none.
    pub avatar: String,
}

impl From<Profile> for UserResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            avatar: profile.avatar.unwrap_or_default(),
        }
    }
}

/// Response returned after a successful signup, login or guest login.
#[must_use]
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// Signed session token.
    pub token: String,
    /// The authenticated identity.
    pub user: UserResponse,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            user: UserResponse::from(session.profile),
        }
    }
}
