//! Security middleware: CORS, response security headers, preflight handling
//! and the request body ceiling.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::header::{self, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{Next, from_fn};
use axum::response::Response;
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::utility::MAX_BODY_SIZE;

/// Extension trait for `axum::`[`Router`] to apply security middleware.
pub trait RouterSecurityExt<S> {
    /// Layers security middlewares with the provided configurations.
    ///
    /// Applies CORS rules, security headers and the body size ceiling, and
    /// answers every `OPTIONS` request with `204 No Content`.
    fn with_security(self, cors: &CorsConfig, headers: &SecurityHeadersConfig) -> Self;

    /// Layers security middlewares with default configurations.
    fn with_default_security(self) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, cors: &CorsConfig, headers: &SecurityHeadersConfig) -> Self {
        let cors_layer = CorsLayer::new()
            .allow_origin(cors.allow_origin())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(cors.credentials_allowed())
            .max_age(cors.max_age());

        let mut router = self
            .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
            .layer(cors_layer)
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static(headers.frame_options.as_str()),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::REFERRER_POLICY,
                HeaderValue::from_static(headers.referrer_policy.as_str()),
            ));

        if let Some(csp) = headers
            .content_security_policy
            .as_deref()
            .and_then(|csp| HeaderValue::from_str(csp).ok())
        {
            router = router.layer(SetResponseHeaderLayer::overriding(
                header::CONTENT_SECURITY_POLICY,
                csp,
            ));
        }

        router.layer(from_fn(answer_preflight))
    }

    fn with_default_security(self) -> Self {
        self.with_security(&CorsConfig::default(), &SecurityHeadersConfig::default())
    }
}

/// Rewrites every `OPTIONS` response to an empty `204`, keeping its headers.
async fn answer_preflight(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;

    if is_preflight {
        *response.status_mut() = StatusCode::NO_CONTENT;
        *response.body_mut() = Body::empty();
        response.headers_mut().remove(header::CONTENT_TYPE);
        response.headers_mut().remove(header::CONTENT_LENGTH);
    }

    response
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// List of allowed CORS origins.
    ///
    /// If empty, every origin is allowed (`*`).
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ORIGINS", value_delimiter = ',')
    )]
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Maximum age for CORS preflight requests in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_MAX_AGE", default_value = "3600")
    )]
    pub max_age_seconds: u64,

    /// Whether to allow credentials in CORS requests.
    ///
    /// Ignored when no origins are configured.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ALLOW_CREDENTIALS", default_value = "false")
    )]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    /// Returns the CORS max age as a Duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Converts configured origins to header values, skipping invalid ones.
    pub fn to_header_values(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| origin.trim().parse().ok())
            .collect()
    }

    /// Returns `*` when no origins are configured, otherwise the list.
    fn allow_origin(&self) -> AllowOrigin {
        if self.allowed_origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(self.to_header_values())
        }
    }

    /// Credentials cannot be combined with a wildcard origin.
    fn credentials_allowed(&self) -> bool {
        self.allow_credentials && !self.allowed_origins.is_empty()
    }
}

/// Security headers configuration for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct SecurityHeadersConfig {
    /// Content Security Policy directives controlling resource loading.
    pub content_security_policy: Option<String>,

    /// X-Frame-Options value protecting against clickjacking.
    pub frame_options: FrameOptions,

    /// Referrer-Policy controlling referrer information in requests.
    pub referrer_policy: ReferrerPolicy,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            content_security_policy: None,
            frame_options: FrameOptions::Deny,
            referrer_policy: ReferrerPolicy::NoReferrer,
        }
    }
}

/// X-Frame-Options header values controlling frame embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameOptions {
    /// The page cannot be displayed in a frame, regardless of the site.
    Deny,
    /// The page can only be displayed in a frame on the same origin.
    SameOrigin,
}

impl FrameOptions {
    /// Returns the header value string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deny => "DENY",
            Self::SameOrigin => "SAMEORIGIN",
        }
    }
}

/// Referrer-Policy header values controlling referrer information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferrerPolicy {
    /// No referrer information is sent.
    NoReferrer,
    /// Sends only the origin as the referrer.
    Origin,
    /// Sends full URL for same-origin, only origin for cross-origin.
    StrictOriginWhenCrossOrigin,
}

impl ReferrerPolicy {
    /// Returns the header value string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoReferrer => "no-referrer",
            Self::Origin => "origin",
            Self::StrictOriginWhenCrossOrigin => "strict-origin-when-cross-origin",
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::handler::routes;
    use crate::handler::test::create_test_server_with_router;

    async fn server(
        cors: CorsConfig,
    ) -> anyhow::Result<(axum_test::TestServer, crate::service::ServiceState, tempfile::TempDir)> {
        create_test_server_with_router(move |_| {
            routes(None).with_security(&cors, &SecurityHeadersConfig::default())
        })
        .await
    }

    #[tokio::test]
    async fn security_headers_on_every_response() -> anyhow::Result<()> {
        let (server, _state, _temp_dir) = server(CorsConfig::default()).await?;

        let response = server
            .get("/api/unknown")
            .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:5173"))
            .await;

        response.assert_status_not_found();
        response.assert_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff");
        response.assert_header(header::X_FRAME_OPTIONS, "DENY");
        response.assert_header(header::REFERRER_POLICY, "no-referrer");
        response.assert_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
        Ok(())
    }

    #[tokio::test]
    async fn options_is_no_content_everywhere() -> anyhow::Result<()> {
        let (server, _state, _temp_dir) = server(CorsConfig::default()).await?;

        for path in ["/api/auth/signup", "/api/unknown", "/index.html"] {
            let response = server.method(Method::OPTIONS, path).await;
            response.assert_status(StatusCode::NO_CONTENT);
            assert!(response.as_bytes().is_empty());
        }

        let preflight = server
            .method(Method::OPTIONS, "/api/auth/login")
            .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:5173"))
            .add_header(
                header::ACCESS_CONTROL_REQUEST_METHOD,
                HeaderValue::from_static("POST"),
            )
            .await;
        preflight.assert_status(StatusCode::NO_CONTENT);
        preflight.assert_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
        Ok(())
    }

    #[tokio::test]
    async fn configured_origins_are_echoed() -> anyhow::Result<()> {
        let cors = CorsConfig {
            allowed_origins: vec!["https://story.app".to_owned()],
            ..CorsConfig::default()
        };
        let (server, _state, _temp_dir) = server(cors).await?;

        let response = server
            .get("/api/unknown")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://story.app"))
            .await;
        response.assert_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "https://story.app");
        Ok(())
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() -> anyhow::Result<()> {
        let (server, _state, _temp_dir) = server(CorsConfig::default()).await?;

        let avatar = format!("data:image/png;base64,{}", "A".repeat(MAX_BODY_SIZE));
        let response = server
            .post("/api/auth/signup")
            .json(&json!({
                "name": "Alex Writer",
                "email": "alex@story.app",
                "password": "correcthorse1",
                "avatar": avatar,
            }))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        response.assert_json_contains(&json!({ "name": "payload_too_large" }));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() -> anyhow::Result<()> {
        let (server, _state, _temp_dir) = server(CorsConfig::default()).await?;

        let response = server
            .post("/api/auth/login")
            .content_type("application/json")
            .bytes("{\"email\":".into())
            .await;

        response.assert_status_bad_request();
        response.assert_json_contains(&json!({ "message": "Invalid JSON body" }));
        Ok(())
    }

    #[test]
    fn credentials_never_combine_with_wildcard() {
        let cors = CorsConfig {
            allow_credentials: true,
            ..CorsConfig::default()
        };
        assert!(!cors.credentials_allowed());
    }
}
