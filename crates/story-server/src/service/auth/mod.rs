//! Account registration, login and guest sessions.

mod auth_service;
mod auth_session;
mod validation;

pub use auth_service::{AuthService, GUEST_TTL, SESSION_TTL};
pub use auth_session::{AuthSession, GUEST_AVATAR, GUEST_EMAIL, GUEST_NAME, Login, Profile, Signup};
pub use validation::{MAX_AVATAR_LEN, is_valid_email, normalize_email};
