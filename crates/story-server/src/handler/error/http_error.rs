//! HTTP errors returned by handlers, extractors and middleware.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Error rendered as an [`ErrorResponse`].
///
/// The kind fixes the status and default body. `message` replaces the default
/// client-facing text; `context` only reaches the logs.
#[derive(Debug, Clone)]
#[must_use = "errors do nothing unless turned into a response"]
pub struct Error<'a> {
    kind: ErrorKind,
    message: Option<Cow<'a, str>>,
    context: Option<Cow<'a, str>>,
}

impl<'a> Error<'a> {
    /// Creates an error with the default body of `kind`.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            context: None,
        }
    }

    /// Replaces the client-facing message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches log-only detail.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();
        let message = self.message.as_deref().unwrap_or(&response.message);
        write!(f, "{} ({}): {}", response.name, response.status, message)
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        let mut response = self.kind.response();

        if let Some(message) = self.message {
            response = response.with_message(message);
        }
        if let Some(context) = self.context {
            response = response.with_context(context);
        }

        response.into_response()
    }
}

impl From<ErrorKind> for Error<'_> {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Status classes a request can fail with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400: malformed body or failed field rules.
    BadRequest,
    /// 401: wrong credentials or session.
    Unauthorized,
    /// 404: unknown route or method.
    NotFound,
    /// 408: request exceeded the configured timeout.
    RequestTimeout,
    /// 409: email or name already registered.
    Conflict,
    /// 413: body over the size ceiling.
    PayloadTooLarge,
    /// 500: anything the client cannot fix.
    #[default]
    InternalServerError,
}

impl ErrorKind {
    /// Converts this kind into an [`Error`].
    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    /// Creates an [`Error`] of this kind with log-only detail.
    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_context(context)
    }

    /// Creates an [`Error`] of this kind with a client-facing message.
    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_message(message)
    }

    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Default body for this kind.
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::Unauthorized => ErrorResponse::UNAUTHORIZED,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::RequestTimeout => ErrorResponse::REQUEST_TIMEOUT,
            Self::Conflict => ErrorResponse::CONFLICT,
            Self::PayloadTooLarge => ErrorResponse::PAYLOAD_TOO_LARGE,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorKind {
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}
