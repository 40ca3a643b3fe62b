//! Credential store configuration.

use std::path::{Path, PathBuf};

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{StoreError, StoreResult};

/// Default location of the user collection file.
const DEFAULT_DATA_PATH: &str = "./data/users.json";

/// Location of the JSON collection backing a [`JsonStore`].
///
/// [`JsonStore`]: crate::JsonStore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "store configurations must be used to open a store"]
pub struct StoreConfig {
    /// Path to the JSON file holding the user collection.
    ///
    /// Missing parent directories and the file itself are created on open.
    #[cfg_attr(
        feature = "config",
        arg(long = "data-path", env = "STORY_DATA_PATH", default_value = DEFAULT_DATA_PATH)
    )]
    #[serde(default = "StoreConfig::default_data_path")]
    pub data_path: PathBuf,
}

impl StoreConfig {
    /// Creates a configuration pointing at the given file.
    pub fn new(data_path: impl AsRef<Path>) -> Self {
        Self {
            data_path: data_path.as_ref().to_path_buf(),
        }
    }

    fn default_data_path() -> PathBuf {
        DEFAULT_DATA_PATH.into()
    }

    /// Path of the sibling file used for atomic rewrites.
    pub(crate) fn temp_path(&self) -> PathBuf {
        let mut file_name = self
            .data_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        file_name.push(".tmp");
        self.data_path.with_file_name(file_name)
    }

    /// Rejects paths that cannot name a collection file.
    pub fn validate(&self) -> StoreResult<()> {
        if self.data_path.as_os_str().is_empty() {
            return Err(StoreError::Config("data path cannot be empty".to_owned()));
        }

        if self.data_path.file_name().is_none() {
            return Err(StoreError::Config(format!(
                "data path '{}' does not name a file",
                self.data_path.display()
            )));
        }

        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_path: Self::default_data_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_data_dir() {
        let config = StoreConfig::default();
        assert_eq!(config.data_path, PathBuf::from("./data/users.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn temp_path_is_a_sibling() {
        let config = StoreConfig::new("/var/lib/story/users.json");
        assert_eq!(
            config.temp_path(),
            PathBuf::from("/var/lib/story/users.json.tmp")
        );
    }

    #[test]
    fn rejects_empty_and_directory_paths() {
        assert!(StoreConfig::new("").validate().is_err());
        assert!(StoreConfig::new("/").validate().is_err());
        assert!(StoreConfig::new("..").validate().is_err());
    }
}
