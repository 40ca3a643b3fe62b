//! Signup, login and guest session issuance.

use std::sync::Arc;

use jiff::SignedDuration;
use rand::RngCore;
use rand::rngs::OsRng;
use story_store::JsonStore;
use story_store::model::{NewUser, PasswordCredential};
use story_store::query::UserRepository;
use tokio::sync::Mutex;

use super::validation::{NormalizedSignup, REQUIRED_LOGIN_FIELDS, normalize_email};
use super::{AuthSession, Login, Profile, Signup};
use crate::service::security::{PasswordHasher, SessionClaims, SessionKeys, SessionToken};
use crate::utility::tracing_targets::AUTHENTICATION as TRACING_TARGET;
use crate::{Error, Result};

/// Lifetime of tokens issued on signup and login.
pub const SESSION_TTL: SignedDuration = SignedDuration::from_hours(24 * 7);

/// Lifetime of guest tokens.
pub const GUEST_TTL: SignedDuration = SignedDuration::from_hours(24);

/// Number of random bytes in a guest id.
const GUEST_ID_BYTES: usize = 12;

const EMAIL_TAKEN: &str = "An account with this email already exists.";
const NAME_TAKEN: &str = "This name is already taken.";
const INVALID_CREDENTIALS: &str = "Invalid credentials.";

/// Authentication service over a [`UserRepository`].
pub struct AuthService<R = JsonStore> {
    inner: Arc<AuthServiceInner<R>>,
}

struct AuthServiceInner<R> {
    repository: R,
    password_hasher: PasswordHasher,
    session_keys: SessionKeys,
    signup_lock: Mutex<()>,
}

impl<R> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> AuthService<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    /// Creates a new authentication service.
    pub fn new(repository: R, password_hasher: PasswordHasher, session_keys: SessionKeys) -> Self {
        Self {
            inner: Arc::new(AuthServiceInner {
                repository,
                password_hasher,
                session_keys,
                signup_lock: Mutex::new(()),
            }),
        }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &R {
        &self.inner.repository
    }

    /// Registers a new account and issues a session for it.
    ///
    /// Uniqueness checks and the append run under one lock, so two concurrent
    /// signups for the same email or name cannot both succeed.
    pub async fn signup(&self, input: Signup) -> Result<AuthSession> {
        let Signup {
            name,
            email,
            password,
            avatar,
        } = input;

        let signup = NormalizedSignup::new(&name, &email, password, avatar)?;
        signup.check_email()?;

        let _guard = self.inner.signup_lock.lock().await;

        if self
            .inner
            .repository
            .find_user_by_email(&signup.email)
            .await?
            .is_some()
        {
            tracing::debug!(target: TRACING_TARGET, "signup rejected: email taken");
            return Err(Error::conflict(EMAIL_TAKEN));
        }

        signup.check_fields()?;

        if self.inner.repository.name_exists(&signup.name).await? {
            tracing::debug!(target: TRACING_TARGET, "signup rejected: name taken");
            return Err(Error::conflict(NAME_TAKEN));
        }

        let password_credential = self.hash_password(signup.password.clone()).await?;

        let user = self
            .inner
            .repository
            .create_user(NewUser {
                name: signup.name,
                email: signup.email,
                avatar: signup.avatar,
                password_credential,
            })
            .await?;

        let session = self.issue(&user.id.to_string(), &user.email, SESSION_TTL)?;

        tracing::info!(
            target: TRACING_TARGET,
            user_id = %user.id,
            "account created"
        );

        Ok(AuthSession {
            token: session.token,
            expires_at: session.expires_at,
            profile: Profile::from(user),
        })
    }

    /// Authenticates with email and password.
    ///
    /// Unknown emails and wrong passwords produce the same error, and an
    /// unknown email still costs one derivation.
    pub async fn login(&self, input: Login) -> Result<AuthSession> {
        let Login { email, password } = input;

        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::validation(REQUIRED_LOGIN_FIELDS));
        }

        let email = normalize_email(&email);
        let user = self.inner.repository.find_user_by_email(&email).await?;

        let Some(user) = user else {
            self.verify_dummy_password(password).await?;
            tracing::debug!(target: TRACING_TARGET, "login rejected: unknown account");
            return Err(Error::authentication(INVALID_CREDENTIALS));
        };

        let verified = self
            .verify_password(password, user.password_credential.clone())
            .await?;

        if !verified {
            tracing::debug!(
                target: TRACING_TARGET,
                user_id = %user.id,
                "login rejected: wrong password"
            );
            return Err(Error::authentication(INVALID_CREDENTIALS));
        }

        let session = self.issue(&user.id.to_string(), &user.email, SESSION_TTL)?;

        tracing::info!(target: TRACING_TARGET, user_id = %user.id, "login succeeded");

        Ok(AuthSession {
            token: session.token,
            expires_at: session.expires_at,
            profile: Profile::from(user),
        })
    }

    /// Issues a short-lived session for a fresh, unpersisted guest identity.
    pub fn guest_login(&self) -> Result<AuthSession> {
        let mut bytes = [0u8; GUEST_ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let guest_id = format!("guest-{}", hex::encode(bytes));

        let profile = Profile::guest(guest_id);
        let session = self.issue(&profile.id, &profile.email, GUEST_TTL)?;

        tracing::info!(target: TRACING_TARGET, guest_id = %profile.id, "guest session issued");

        Ok(AuthSession {
            token: session.token,
            expires_at: session.expires_at,
            profile,
        })
    }

    /// Verifies a session token previously issued by this service.
    pub fn verify_token(&self, token: &str) -> Result<SessionClaims> {
        self.inner.session_keys.verify(token)
    }

    fn issue(&self, sub: &str, email: &str, ttl: SignedDuration) -> Result<SessionToken> {
        self.inner.session_keys.issue(sub, email, ttl)
    }

    async fn hash_password(&self, password: String) -> Result<PasswordCredential> {
        let hasher = self.inner.password_hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| Error::internal("password_hasher", "hashing task failed").with_source(e))?
    }

    async fn verify_password(&self, password: String, credential: PasswordCredential) -> Result<bool> {
        let hasher = self.inner.password_hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &credential))
            .await
            .map_err(|e| {
                Error::internal("password_hasher", "verification task failed").with_source(e)
            })?
    }

    async fn verify_dummy_password(&self, password: String) -> Result<bool> {
        let hasher = self.inner.password_hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify_dummy_password(&password))
            .await
            .map_err(|e| {
                Error::internal("password_hasher", "verification task failed").with_source(e)
            })
    }
}

impl<R> std::fmt::Debug for AuthService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("session_keys", &self.inner.session_keys)
            .finish_non_exhaustive()
    }
}
