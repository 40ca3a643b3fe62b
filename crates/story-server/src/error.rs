//! Service layer error types.
//!
//! Every service operation returns [`Result`] with an [`Error`] whose
//! [`ErrorKind`] decides the HTTP status it is rendered with.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for service layer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error kind enumeration for categorizing service layer errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// Duplicate email or display name.
    Conflict,
    /// Unknown account, wrong password or an invalid session token.
    Authentication,
    /// Reading or persisting the credential store failed.
    Storage,
    /// Configuration-related errors.
    Config,
    /// Internal service logic errors.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::Authentication => "authentication",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Internal => "internal_service",
        }
    }

    /// Returns whether the message of this kind is safe to show to clients.
    #[must_use]
    pub const fn is_client_facing(self) -> bool {
        matches!(self, Self::Validation | Self::Conflict | Self::Authentication)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service layer error with structured information.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a new validation error.
    #[inline]
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Creates a new conflict error.
    #[inline]
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Creates a new authentication error.
    #[inline]
    pub fn authentication(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Creates a new storage error.
    #[inline]
    pub fn storage(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a new internal service error.
    #[inline]
    pub fn internal(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let service_name = service.into();
        let msg = message.into();
        Self::new(ErrorKind::Internal, format!("{service_name}: {msg}"))
    }
}

impl From<story_store::StoreError> for Error {
    fn from(err: story_store::StoreError) -> Self {
        Error::storage("credential store operation failed").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_creation() {
        let error = Error::validation("Name, email, and password are required.");
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(error.message(), "Name, email, and password are required.");
    }

    #[test]
    fn store_errors_become_storage_errors() {
        let source = std::io::Error::other("disk full");
        let error = Error::from(story_store::StoreError::from(source));

        assert_eq!(error.kind(), ErrorKind::Storage);
        assert!(StdError::source(&error).is_some());
        assert!(!error.message().contains("disk full"));
    }

    #[test]
    fn internal_error_names_service() {
        let error = Error::internal("password_hasher", "worker thread failed");
        assert_eq!(error.kind(), ErrorKind::Internal);
        assert!(error.to_string().contains("password_hasher"));
    }

    #[test]
    fn client_facing_kinds() {
        assert!(ErrorKind::Conflict.is_client_facing());
        assert!(ErrorKind::Authentication.is_client_facing());
        assert!(!ErrorKind::Storage.is_client_facing());
        assert!(!ErrorKind::Internal.is_client_facing());
        assert_eq!(ErrorKind::Storage.as_str(), "storage");
    }
}
