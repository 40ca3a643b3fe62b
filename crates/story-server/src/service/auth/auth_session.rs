//! Inputs and outputs of the authentication service.

use std::fmt;

use jiff::Timestamp;
use story_store::model::User;

/// Display name of every guest profile.
pub const GUEST_NAME: &str = "Guest Explorer";

/// Email carried by every guest token.
pub const GUEST_EMAIL: &str = "guest@story.app";

/// Placeholder avatar shown for guest profiles.
pub const GUEST_AVATAR: &str = "https://images.unsplash.com/photo-1517840545244-4a1c5c9c79ef?auto=format&fit=crop&w=200&q=80";

/// Account registration input, as received from the client.
#[derive(Clone, Default)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: Option<String>,
}

impl fmt::Debug for Signup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signup")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Email and password login input.
#[derive(Clone, Default)]
pub struct Login {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Public projection of an account or guest identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl Profile {
    /// The fixed profile returned for guest sessions.
    pub fn guest(id: String) -> Self {
        Self {
            id,
            name: GUEST_NAME.to_owned(),
            email: GUEST_EMAIL.to_owned(),
            avatar: Some(GUEST_AVATAR.to_owned()),
        }
    }
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            avatar: user.avatar,
        }
    }
}

/// A signed session token and the profile it was issued for.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub expires_at: Timestamp,
    pub profile: Profile,
}
