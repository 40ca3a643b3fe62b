//! Application state and dependency injection.

pub mod auth;
mod config;
pub mod security;

use story_store::JsonStore;

pub use crate::service::auth::AuthService;
pub use crate::service::config::ServiceConfig;
pub use crate::service::security::{PasswordHasher, SessionKeys, SessionKeysConfig};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    // External services:
    pub store: JsonStore,

    // Internal services:
    pub session_keys: SessionKeys,
    pub auth_service: AuthService,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Opens the credential store and loads the session signing secret.
    pub async fn from_config(service_config: &ServiceConfig) -> Result<Self> {
        let store = service_config.open_store().await?;
        let session_keys = service_config.load_session_keys()?;
        Ok(Self::new(store, session_keys))
    }

    /// Assembles state from an opened store and loaded keys.
    pub fn new(store: JsonStore, session_keys: SessionKeys) -> Self {
        let auth_service =
            AuthService::new(store.clone(), PasswordHasher::new(), session_keys.clone());

        Self {
            store,
            session_keys,
            auth_service,
        }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(auth_service: AuthService);

#[cfg(test)]
mod tests {
    use story_store::StoreConfig;
    use story_store::query::UserRepository;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn state_from_config_creates_store() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let data_path = temp_dir.path().join("nested").join("users.json");
        let config = ServiceConfig::new(StoreConfig::new(&data_path))
            .with_token_secret("0123456789abcdef0123456789abcdef");

        let state = ServiceState::from_config(&config).await?;

        assert!(data_path.exists());
        assert!(!state.session_keys.is_ephemeral());
        assert_eq!(state.auth_service.repository().count_users().await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_store_fails_startup() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let data_path = temp_dir.path().join("users.json");
        std::fs::write(&data_path, "{ not json")?;

        let err = ServiceState::from_config(&ServiceConfig::new(StoreConfig::new(&data_path)))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::Storage);
        Ok(())
    }
}
