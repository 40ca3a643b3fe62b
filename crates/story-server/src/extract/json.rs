//! JSON extractor with uniform error bodies.
//!
//! [`Json`] reads the raw body (so the router's body limit applies), parses it
//! regardless of the declared content type, and maps every failure onto the
//! crate's [`Error`] response shape.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};
use crate::utility::tracing_targets::EXTRACT as TRACING_TARGET;

/// JSON request extractor and response wrapper.
///
/// An empty body is read as `{}`, so request types with defaults see their
/// missing-field values instead of a parse error.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Creates a new [`Json`] wrapper around the provided value.
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;

        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &bytes
        };

        serde_json::from_slice(body).map(Self::new).map_err(|e| {
            tracing::debug!(
                target: TRACING_TARGET,
                error = %e,
                "Rejected malformed JSON body"
            );
            ErrorKind::BadRequest
                .with_message("Invalid JSON body")
                .with_context(sanitize_error_message(&e.to_string()))
        })
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    #[inline]
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<BytesRejection> for Error<'static> {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            tracing::debug!(target: TRACING_TARGET, "Rejected oversized request body");
            return ErrorKind::PayloadTooLarge.into_error();
        }

        ErrorKind::BadRequest
            .with_message("Failed to read request body")
            .with_context(sanitize_error_message(&rejection.body_text()))
    }
}

/// Truncates parser messages before they are attached as context.
fn sanitize_error_message(message: &str) -> String {
    let lines = message.lines().take(3).collect::<Vec<_>>();
    lines.join(" ").chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Payload {
        name: Option<String>,
    }

    fn request(body: &'static str) -> anyhow::Result<Request> {
        Ok(axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))?)
    }

    #[tokio::test]
    async fn parses_without_content_type() -> anyhow::Result<()> {
        let Json(payload) = Json::<Payload>::from_request(request(r#"{"name":"Alex"}"#)?, &())
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        assert_eq!(payload.name.as_deref(), Some("Alex"));
        Ok(())
    }

    #[tokio::test]
    async fn empty_body_reads_as_empty_object() -> anyhow::Result<()> {
        let Json(payload) = Json::<Payload>::from_request(request("")?, &())
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))?;

        assert!(payload.name.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() -> anyhow::Result<()> {
        let error = Json::<Payload>::from_request(request("{not json")?, &())
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.message(), Some("Invalid JSON body"));
        Ok(())
    }

    #[test]
    fn sanitize_truncates() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_error_message(&long).len(), 200);
    }
}
