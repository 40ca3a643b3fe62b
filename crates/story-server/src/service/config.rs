//! Service layer configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use story_store::{JsonStore, StoreConfig};

use crate::service::security::{SessionKeys, SessionKeysConfig};
use crate::{Error, Result};

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Credential store location.
    #[cfg_attr(feature = "config", clap(flatten))]
    #[serde(default)]
    pub store: StoreConfig,

    /// Session signing secret.
    #[cfg_attr(feature = "config", clap(flatten))]
    #[serde(default)]
    pub session: SessionKeysConfig,
}

impl ServiceConfig {
    /// Creates a configuration for the given store with an ephemeral secret.
    pub fn new(store: StoreConfig) -> Self {
        Self {
            store,
            session: SessionKeysConfig::default(),
        }
    }

    /// Sets a fixed session signing secret.
    pub fn with_token_secret(mut self, token_secret: impl Into<String>) -> Self {
        self.session = SessionKeysConfig::new(token_secret);
        self
    }

    /// Opens the JSON credential store, creating it when missing.
    pub async fn open_store(&self) -> Result<JsonStore> {
        self.store.validate().map_err(|e| {
            Error::config(format!("invalid store configuration: {e}")).with_source(e)
        })?;

        JsonStore::open(self.store.clone()).await.map_err(|e| {
            Error::storage(format!(
                "failed to open credential store at {}",
                self.store.data_path.display()
            ))
            .with_source(e)
        })
    }

    /// Loads the session signing keys.
    pub fn load_session_keys(&self) -> Result<SessionKeys> {
        SessionKeys::from_config(&self.session)
    }
}
