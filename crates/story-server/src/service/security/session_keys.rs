//! Session secret management and signed session tokens.
//!
//! Tokens are HS256 JWTs carrying `sub`, `email` and `exp` (seconds).

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::utility::tracing_targets::SESSION_KEYS as TRACING_TARGET;
use crate::{Error, Result};

/// Length of a generated ephemeral secret in bytes.
const EPHEMERAL_SECRET_LEN: usize = 32;

/// Secrets shorter than this are accepted with a warning.
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Message returned for every token that fails verification.
const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired session token.";

/// Session signing secret configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SessionKeysConfig {
    /// Secret used to sign session tokens.
    ///
    /// When absent a random secret is generated at startup and every issued
    /// token becomes invalid on restart.
    #[cfg_attr(
        feature = "config",
        arg(long = "token-secret", env = "STORY_TOKEN_SECRET", hide_env_values = true)
    )]
    #[serde(default)]
    pub token_secret: Option<String>,
}

impl SessionKeysConfig {
    /// Creates a configuration with a fixed secret.
    pub fn new(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: Some(token_secret.into()),
        }
    }
}

impl fmt::Debug for SessionKeysConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeysConfig")
            .field(
                "token_secret",
                &self.token_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Claims carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user id, or a `guest-` id for guest sessions.
    pub sub: String,
    /// Email the session was issued for.
    pub email: String,
    /// Expiry in seconds since the Unix epoch.
    pub exp: i64,
}

/// A freshly issued token and its expiry.
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// Compact signed token.
    pub token: String,
    /// Instant after which the token is rejected.
    pub expires_at: Timestamp,
}

/// Process-wide session signing secret.
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<SessionKeysInner>,
}

struct SessionKeysInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ephemeral: bool,
}

impl SessionKeysInner {
    fn new(secret: &[u8], ephemeral: bool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ephemeral,
        }
    }
}

impl SessionKeys {
    /// Loads the signing secret from configuration, generating a random one
    /// when none is configured.
    pub fn from_config(config: &SessionKeysConfig) -> Result<Self> {
        match config.token_secret.as_deref() {
            Some(secret) => Self::new(secret.as_bytes()),
            None => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    "no token secret configured, generated an ephemeral one; \
                     sessions will not survive a restart"
                );
                Ok(Self::ephemeral())
            }
        }
    }

    /// Creates keys from an explicit secret.
    pub fn new(secret: &[u8]) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::config("token secret cannot be empty"));
        }

        if secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                target: TRACING_TARGET,
                length = secret.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "token secret is shorter than recommended"
            );
        }

        tracing::info!(target: TRACING_TARGET, "session keys loaded");

        Ok(Self {
            inner: Arc::new(SessionKeysInner::new(secret, false)),
        })
    }

    /// Creates keys from a random secret that lives only as long as the process.
    pub fn ephemeral() -> Self {
        let mut secret = vec![0u8; EPHEMERAL_SECRET_LEN];
        OsRng.fill_bytes(&mut secret);

        Self {
            inner: Arc::new(SessionKeysInner::new(&secret, true)),
        }
    }

    /// Returns whether the secret was generated at startup.
    #[inline]
    pub fn is_ephemeral(&self) -> bool {
        self.inner.ephemeral
    }

    /// Signs a token for `sub` valid for `ttl` from now.
    pub fn issue(&self, sub: &str, email: &str, ttl: SignedDuration) -> Result<SessionToken> {
        let expires_at = Timestamp::now().checked_add(ttl).map_err(|e| {
            Error::internal("session_keys", format!("token expiry out of range: {e}"))
        })?;

        let claims = SessionClaims {
            sub: sub.to_owned(),
            email: email.to_owned(),
            exp: expires_at.as_second(),
        };

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, &self.inner.encoding_key).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to sign session token"
            );
            Error::internal("session_keys", "failed to sign session token").with_source(e)
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            sub = %claims.sub,
            exp = claims.exp,
            "session token issued"
        );

        Ok(SessionToken { token, expires_at })
    }

    /// Verifies a token against the current time.
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        self.verify_at(token, Timestamp::now())
    }

    /// Verifies a token's algorithm and signature, then rejects it when `exp`
    /// is not after `now`.
    pub fn verify_at(&self, token: &str, now: Timestamp) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        let token_data = decode::<SessionClaims>(token, &self.inner.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %e,
                    "session token rejected"
                );
                Error::authentication(INVALID_TOKEN_MESSAGE)
            })?;

        let claims = token_data.claims;
        if claims.exp <= now.as_second() {
            tracing::debug!(target: TRACING_TARGET, "session token expired");
            return Err(Error::authentication(INVALID_TOKEN_MESSAGE));
        }

        Ok(claims)
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("secret", &"[REDACTED]")
            .field("ephemeral", &self.inner.ephemeral)
            .finish()
    }
}
