//! Persisted record types.

mod user;

pub use user::{NewUser, PasswordCredential, User};
