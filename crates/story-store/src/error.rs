//! Error types for credential store operations.

use std::borrow::Cow;

/// Error type for all credential store operations.
#[derive(Debug, thiserror::Error)]
#[must_use = "store errors should be handled appropriately"]
pub enum StoreError {
    /// Configuration error.
    ///
    /// Raised for an unusable data path before any I/O is attempted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing the collection file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The collection file could not be encoded or decoded.
    ///
    /// On open this means the file exists but is not a JSON array of users.
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unexpected error occurred.
    #[error("Unexpected error: {0}")]
    Unexpected(Cow<'static, str>),
}

impl StoreError {
    /// Returns whether the failure happened while talking to the filesystem.
    pub fn is_io(&self) -> bool {
        matches!(self, StoreError::Io(_))
    }
}

/// Specialized [`Result`] type for store operations.
pub type StoreResult<T, E = StoreError> = Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_are_flagged() {
        let error = StoreError::from(std::io::Error::other("disk full"));
        assert!(error.is_io());
        assert!(error.to_string().contains("disk full"));
    }

    #[test]
    fn serialization_errors_are_not_io() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let error = StoreError::from(source);
        assert!(!error.is_io());
        assert!(error.to_string().starts_with("Storage serialization error"));
    }
}
