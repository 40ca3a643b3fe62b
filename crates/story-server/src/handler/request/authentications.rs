//! Authentication request types.
//!
//! Every field is optional at the JSON level so that missing and `null`
//! values reach the service's required-field check instead of failing
//! deserialization.

use std::fmt;

use serde::Deserialize;

use crate::service::auth::{Login, Signup};

/// Request payload for signup.
#[must_use]
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    /// Display name of the account.
    pub name: Option<String>,
    /// Email address of the account.
    pub email: Option<String>,
    /// Password of the account.
    pub password: Option<String>,
    /// Optional avatar URL or image data URI.
    pub avatar: Option<String>,
}

impl From<SignupRequest> for Signup {
    fn from(request: SignupRequest) -> Self {
        Self {
            name: request.name.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            password: request.password.unwrap_or_default(),
            avatar: request.avatar,
        }
    }
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Request payload for login.
#[must_use]
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    /// Email address of the account.
    pub email: Option<String>,
    /// Password of the account.
    pub password: Option<String>,
}

impl From<LoginRequest> for Login {
    fn from(request: LoginRequest) -> Self {
        Self {
            email: request.email.unwrap_or_default(),
            password: request.password.unwrap_or_default(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_null_fields_become_empty() -> anyhow::Result<()> {
        let request: SignupRequest =
            serde_json::from_str(r#"{"name":null,"email":"alex@story.app"}"#)?;
        let signup = Signup::from(request);

        assert!(signup.name.is_empty());
        assert_eq!(signup.email, "alex@story.app");
        assert!(signup.password.is_empty());
        assert!(signup.avatar.is_none());
        Ok(())
    }

    #[test]
    fn debug_omits_password() -> anyhow::Result<()> {
        let request: LoginRequest =
            serde_json::from_str(r#"{"email":"alex@story.app","password":"correcthorse1"}"#)?;
        assert!(!format!("{request:?}").contains("correcthorse1"));
        Ok(())
    }
}
