//! User repository for looking up and appending accounts.

use std::future::Future;

use uuid::Uuid;

use crate::model::{NewUser, User};
use crate::{JsonStore, StoreResult, TRACING_TARGET_QUERY};

/// Repository for user record operations.
///
/// Records are only ever appended; there is no update or delete.
pub trait UserRepository {
    /// Finds a user by email address.
    ///
    /// Email comparison is case-insensitive.
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Returns whether any user has the given display name, ignoring case.
    fn name_exists(&self, name: &str) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Appends a new user and durably persists the collection.
    ///
    /// Assigns a fresh identifier and creation timestamp. If persisting fails
    /// the record is not kept and the error is returned without retrying.
    fn create_user(&self, new_user: NewUser) -> impl Future<Output = StoreResult<User>> + Send;

    /// Returns the number of stored users.
    fn count_users(&self) -> impl Future<Output = StoreResult<usize>> + Send;
}

impl UserRepository for JsonStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.read().await;
        let user = users.iter().find(|user| user.has_email(email)).cloned();

        tracing::trace!(
            target: TRACING_TARGET_QUERY,
            found = user.is_some(),
            "find_user_by_email"
        );

        Ok(user)
    }

    async fn name_exists(&self, name: &str) -> StoreResult<bool> {
        let users = self.read().await;
        Ok(users.iter().any(|user| user.has_name(name)))
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut users = self.write().await;

        let mut id = Uuid::new_v4();
        while users.iter().any(|user| user.id == id) {
            id = Uuid::new_v4();
        }

        let user = User::from_new(new_user, id);
        users.push(user.clone());

        if let Err(e) = self.persist(&users).await {
            users.pop();
            tracing::error!(
                target: TRACING_TARGET_QUERY,
                user_id = %user.id,
                error = %e,
                "Failed to persist new user, record discarded"
            );
            return Err(e);
        }

        tracing::info!(
            target: TRACING_TARGET_QUERY,
            user_id = %user.id,
            user_count = users.len(),
            "User appended"
        );

        Ok(user)
    }

    async fn count_users(&self) -> StoreResult<usize> {
        Ok(self.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::StoreConfig;
    use crate::model::PasswordCredential;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_owned(),
            email: email.to_owned(),
            avatar: None,
            password_credential: PasswordCredential {
                salt: "0011".to_owned(),
                hash: "2233".to_owned(),
            },
        }
    }

    async fn open_store(temp_dir: &TempDir) -> anyhow::Result<JsonStore> {
        let config = StoreConfig::new(temp_dir.path().join("users.json"));
        Ok(JsonStore::open(config).await?)
    }

    #[tokio::test]
    async fn create_and_find_user() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let store = open_store(&temp_dir).await?;

        let created = store
            .create_user(new_user("Alex Writer", "alex@story.app"))
            .await?;

        let found = store.find_user_by_email("ALEX@Story.App").await?;
        assert_eq!(found, Some(created));
        assert!(store.find_user_by_email("other@story.app").await?.is_none());
        assert_eq!(store.count_users().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn name_exists_ignores_case() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let store = open_store(&temp_dir).await?;
        store
            .create_user(new_user("Alex Writer", "alex@story.app"))
            .await?;

        assert!(store.name_exists("ALEX WRITER").await?);
        assert!(!store.name_exists("Alex").await?);
        Ok(())
    }

    #[tokio::test]
    async fn appended_users_survive_reopen() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let store = open_store(&temp_dir).await?;
        let first = store.create_user(new_user("First", "first@story.app")).await?;
        let second = store
            .create_user(new_user("Second", "second@story.app"))
            .await?;
        assert_ne!(first.id, second.id);
        drop(store);

        let reopened = open_store(&temp_dir).await?;
        assert_eq!(reopened.count_users().await?, 2);
        assert_eq!(
            reopened.find_user_by_email("second@story.app").await?,
            Some(second)
        );
        Ok(())
    }

    #[tokio::test]
    async fn failed_persist_discards_record() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let data_dir = temp_dir.path().join("data");
        let store = JsonStore::open(StoreConfig::new(data_dir.join("users.json"))).await?;

        // Removing the directory makes the temp file write fail.
        std::fs::remove_dir_all(&data_dir)?;

        let result = store
            .create_user(new_user("Alex Writer", "alex@story.app"))
            .await;

        assert!(matches!(result, Err(crate::StoreError::Io(_))));
        assert_eq!(store.count_users().await?, 0);
        assert!(store.find_user_by_email("alex@story.app").await?.is_none());
        Ok(())
    }
}
