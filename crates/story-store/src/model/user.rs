//! User record model.
//!
//! - [`User`] - A registered account as stored in the collection file
//! - [`NewUser`] - Data for appending a new account
//! - [`PasswordCredential`] - Salt and derived hash pair

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account.
///
/// Field names are serialized in camelCase, matching the on-disk layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier, assigned on creation.
    pub id: Uuid,
    /// Trimmed display name, unique ignoring case.
    pub name: String,
    /// Trimmed, lowercased email address, unique ignoring case.
    pub email: String,
    /// Optional avatar reference (http(s) URL or image data URI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Salted password derivation. Never leaves the server.
    pub password_credential: PasswordCredential,
    /// Timestamp when the account was created.
    pub created_at: Timestamp,
}

impl User {
    /// Builds a record from [`NewUser`] with a fresh id and creation time.
    pub(crate) fn from_new(new_user: NewUser, id: Uuid) -> Self {
        Self {
            id,
            name: new_user.name,
            email: new_user.email,
            avatar: new_user.avatar,
            password_credential: new_user.password_credential,
            created_at: Timestamp::now(),
        }
    }

    /// Returns whether this record's email matches, ignoring case.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }

    /// Returns whether this record's name matches, ignoring case.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Data for creating a new account.
///
/// Fields are expected to be validated and normalized by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub password_credential: PasswordCredential,
}

/// Hex-encoded salt and derived hash of a password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCredential {
    /// Random per-credential salt, hex encoded.
    pub salt: String,
    /// Derived hash over the password and salt, hex encoded.
    pub hash: String,
}

impl fmt::Debug for PasswordCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredential").finish_non_exhaustive()
    }
}
