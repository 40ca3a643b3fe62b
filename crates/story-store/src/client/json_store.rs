use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::model::User;
use crate::{StoreConfig, StoreResult, TRACING_TARGET_CLIENT};

/// File-backed user collection.
///
/// The whole collection is loaded on [`open`] and held in memory. Every
/// append rewrites the file while the write lock is held, so readers never
/// observe a record that failed to persist. Cloning is cheap and shares the
/// same collection.
///
/// [`open`]: JsonStore::open
#[derive(Clone)]
pub struct JsonStore {
    inner: Arc<JsonStoreInner>,
}

struct JsonStoreInner {
    users: RwLock<Vec<User>>,
    config: StoreConfig,
}

impl JsonStore {
    /// Opens the collection at the configured path.
    ///
    /// A missing file is created as an empty collection (along with its
    /// parent directories), and an empty file is read as an empty collection.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    ///
    /// - The configured path is invalid
    /// - The file cannot be read or created
    /// - The file exists but does not hold a JSON array of users
    #[tracing::instrument(
        skip(config),
        target = TRACING_TARGET_CLIENT,
        fields(data_path = %config.data_path.display())
    )]
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;

        let users = load_users(&config.data_path).await?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            user_count = users.len(),
            "Credential store opened"
        );

        Ok(Self {
            inner: Arc::new(JsonStoreInner {
                users: RwLock::new(users),
                config,
            }),
        })
    }

    /// Returns the configuration this store was opened with.
    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Vec<User>> {
        self.inner.users.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Vec<User>> {
        self.inner.users.write().await
    }

    /// Rewrites the collection file with `users`.
    ///
    /// Writes a sibling temp file and renames it over the target.
    pub(crate) async fn persist(&self, users: &[User]) -> StoreResult<()> {
        let config = &self.inner.config;
        let contents = serde_json::to_vec_pretty(users)?;
        let temp_path = config.temp_path();

        tokio::fs::write(&temp_path, &contents).await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_CLIENT,
                path = %temp_path.display(),
                error = %e,
                "Failed to write temporary collection file"
            );
            e
        })?;

        tokio::fs::rename(&temp_path, &config.data_path)
            .await
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET_CLIENT,
                    path = %config.data_path.display(),
                    error = %e,
                    "Failed to replace collection file"
                );
                e
            })?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            user_count = users.len(),
            bytes = contents.len(),
            "Collection persisted"
        );

        Ok(())
    }
}

/// Loads the collection, creating an empty one when the file is missing.
async fn load_users(path: &Path) -> StoreResult<Vec<User>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(
                target: TRACING_TARGET_CLIENT,
                path = %path.display(),
                "Collection file not found, creating an empty one"
            );

            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await?;
            }

            tokio::fs::write(path, b"[]").await?;
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&contents).map_err(|e| {
        tracing::error!(
            target: TRACING_TARGET_CLIENT,
            path = %path.display(),
            error = %e,
            "Collection file is not a valid user array"
        );
        e.into()
    })
}

impl fmt::Debug for JsonStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonStore")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn creates_missing_file_and_parents() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested").join("users.json");

        let store = JsonStore::open(StoreConfig::new(&path)).await?;

        assert!(store.read().await.is_empty());
        assert_eq!(std::fs::read_to_string(&path)?, "[]");
        Ok(())
    }

    #[tokio::test]
    async fn reads_empty_file_as_empty_collection() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("users.json");
        std::fs::write(&path, "  \n")?;

        let store = JsonStore::open(StoreConfig::new(&path)).await?;
        assert!(store.read().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn rejects_corrupt_file() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("users.json");
        std::fs::write(&path, "{ not json")?;

        let result = JsonStore::open(StoreConfig::new(&path)).await;
        assert!(matches!(result, Err(crate::StoreError::Serialization(_))));

        // The corrupt file is left untouched.
        assert_eq!(std::fs::read_to_string(&path)?, "{ not json");
        Ok(())
    }

    #[tokio::test]
    async fn persist_leaves_no_temp_file() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let config = StoreConfig::new(temp_dir.path().join("users.json"));
        let store = JsonStore::open(config.clone()).await?;

        store.persist(&[]).await?;

        assert!(!config.temp_path().exists());
        assert!(config.data_path.exists());
        Ok(())
    }
}
