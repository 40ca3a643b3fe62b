//! Salted password derivation and constant-time verification using Argon2id.
//!
//! Each credential stores a random 16-byte salt next to the 32-byte Argon2id
//! output, both hex encoded. Verification recomputes the output with the
//! stored salt and compares it in constant time.

use argon2::Argon2;
use argon2::password_hash::Output;
use rand::RngCore;
use rand::rngs::OsRng;
use story_store::model::PasswordCredential;

use crate::utility::tracing_targets::PASSWORD_HASHER as TRACING_TARGET;
use crate::{Error, Result};

/// Length of the random salt in bytes.
const SALT_LEN: usize = 16;

/// Length of the derived hash in bytes.
const HASH_LEN: usize = 32;

/// Password hashing and verification service using Argon2id.
///
/// Derivation is CPU and memory heavy; async callers should run it on the
/// blocking pool.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Creates a hasher with the default Argon2id parameters.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Derives a new credential from `password` with a fresh random salt.
    ///
    /// Two calls with the same password never share a salt.
    pub fn hash_password(&self, password: &str) -> Result<PasswordCredential> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let hash = self.derive(password.as_bytes(), &salt)?;

        Ok(PasswordCredential {
            salt: hex::encode(salt),
            hash: hex::encode(hash),
        })
    }

    /// Verifies `password` against a stored credential.
    ///
    /// Returns `Ok(false)` for a wrong password. Errors only when the stored
    /// credential is corrupt or derivation itself fails.
    pub fn verify_password(&self, password: &str, credential: &PasswordCredential) -> Result<bool> {
        let salt = hex::decode(&credential.salt).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "stored salt is not valid hex"
            );
            Error::internal("password_hasher", "stored credential is corrupt").with_source(e)
        })?;

        let expected = hex::decode(&credential.hash).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "stored hash is not valid hex"
            );
            Error::internal("password_hasher", "stored credential is corrupt").with_source(e)
        })?;

        let derived = self.derive(password.as_bytes(), &salt)?;
        let matches = constant_time_eq(&derived, &expected)?;

        tracing::debug!(
            target: TRACING_TARGET,
            matches,
            "password verification completed"
        );

        Ok(matches)
    }

    /// Performs a derivation against a random salt so that lookups of unknown
    /// accounts take as long as real verifications. Always returns `false`.
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        let mut salt = [0u8; SALT_LEN];
        let mut expected = [0u8; HASH_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut expected);

        if let Ok(derived) = self.derive(password.as_bytes(), &salt) {
            let _ = constant_time_eq(&derived, &expected);
        }

        false
    }

    fn derive(&self, password: &[u8], salt: &[u8]) -> Result<[u8; HASH_LEN]> {
        let mut output = [0u8; HASH_LEN];
        self.argon2
            .hash_password_into(password, salt, &mut output)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password derivation failed"
                );
                Error::internal("password_hasher", format!("derivation failed: {e}"))
            })?;

        Ok(output)
    }
}

/// Compares two derived hashes without short-circuiting on the first
/// differing byte.
fn constant_time_eq(derived: &[u8], expected: &[u8]) -> Result<bool> {
    if derived.len() != expected.len() {
        return Ok(false);
    }

    let derived = Output::new(derived).map_err(|e| {
        Error::internal("password_hasher", format!("invalid derived output: {e}"))
    })?;
    let expected = Output::new(expected).map_err(|e| {
        Error::internal("password_hasher", format!("invalid stored output: {e}"))
    })?;

    // `Output` equality is constant-time.
    Ok(derived == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_password() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();
        let credential = hasher.hash_password("correcthorse1")?;

        assert_eq!(credential.salt.len(), SALT_LEN * 2);
        assert_eq!(credential.hash.len(), HASH_LEN * 2);
        assert!(hasher.verify_password("correcthorse1", &credential)?);
        assert!(!hasher.verify_password("correcthorse2", &credential)?);

        Ok(())
    }

    #[test]
    fn hash_produces_unique_salts() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();

        let first = hasher.hash_password("same password")?;
        let second = hasher.hash_password("same password")?;

        assert_ne!(first.salt, second.salt);
        assert_ne!(first.hash, second.hash);
        assert!(hasher.verify_password("same password", &first)?);
        assert!(hasher.verify_password("same password", &second)?);

        Ok(())
    }

    #[test]
    fn corrupt_credential_is_an_error() {
        let hasher = PasswordHasher::new();
        let credential = PasswordCredential {
            salt: "not hex".to_owned(),
            hash: "00".repeat(HASH_LEN),
        };

        let result = hasher.verify_password("whatever", &credential);
        assert!(matches!(result, Err(e) if e.kind() == crate::ErrorKind::Internal));
    }

    #[test]
    fn truncated_hash_never_matches() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();
        let mut credential = hasher.hash_password("correcthorse1")?;
        credential.hash.truncate(HASH_LEN);

        assert!(!hasher.verify_password("correcthorse1", &credential)?);
        Ok(())
    }

    #[test]
    fn dummy_verification_always_fails() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify_dummy_password("correcthorse1"));
    }
}
