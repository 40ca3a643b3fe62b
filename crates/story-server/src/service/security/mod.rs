//! Security infrastructure services.
//!
//! Password hashing and session token signing.

mod password_hasher;
mod session_keys;

pub use password_hasher::PasswordHasher;
pub use session_keys::{SessionClaims, SessionKeys, SessionKeysConfig, SessionToken};
