#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use story_server::handler::routes;
use story_server::middleware::{
    RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt, SecurityHeadersConfig,
};
use story_server::service::{ServiceConfig, ServiceState};
use story_store::query::UserRepository;

use crate::config::{Cli, MiddlewareConfig, ServerConfig};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "story_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "story_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "story_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.validate()?;
    cli.log();

    let state = create_service_state(&cli.service).await?;
    let router = create_router(state, &cli.server, &cli.middleware);

    server::serve(router, cli.server)
        .await
        .context("http server failed")?;

    Ok(())
}

/// Opens the credential store and loads the session signing keys.
async fn create_service_state(config: &ServiceConfig) -> anyhow::Result<ServiceState> {
    let state = ServiceState::from_config(config)
        .await
        .context("failed to create service state")?;

    let user_count = state
        .store
        .count_users()
        .await
        .context("failed to read credential store")?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        data_path = %config.store.data_path.display(),
        user_count,
        ephemeral_secret = state.session_keys.is_ephemeral(),
        "service state ready"
    );

    Ok(state)
}

/// Creates the router with all middleware layers applied.
fn create_router(
    state: ServiceState,
    server: &ServerConfig,
    middleware: &MiddlewareConfig,
) -> Router {
    let router = routes(server.static_dir.as_deref()).with_state(state);
    apply_middleware(router, middleware)
}

/// Layers middleware in reverse order (last added = outermost):
/// 1. Observability (outermost) - request IDs and tracing spans
/// 2. Security - preflight, CORS, security headers, body limit
/// 3. Recovery - catches panics and enforces timeouts
/// 4. Routes (innermost) - API handlers and static files
///
/// Recovery sits inside security so panic and timeout responses still carry
/// the CORS and security headers.
fn apply_middleware(router: Router, middleware: &MiddlewareConfig) -> Router {
    router
        .with_recovery(&middleware.recovery)
        .with_security(&middleware.cors, &SecurityHeadersConfig::default())
        .with_observability()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::{HeaderValue, StatusCode, header};
    use axum::routing::get;
    use axum_test::TestServer;
    use story_server::middleware::{REQUEST_ID_HEADER, RecoveryConfig};

    use super::*;

    async fn panics() -> &'static str {
        panic!("handler exploded")
    }

    async fn sleeps() -> &'static str {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "done"
    }

    fn test_server(middleware: &MiddlewareConfig) -> anyhow::Result<TestServer> {
        let router = Router::new()
            .route("/api/panic", get(panics))
            .route("/api/slow", get(sleeps));
        Ok(TestServer::new(apply_middleware(router, middleware))?)
    }

    fn assert_security_headers(response: &axum_test::TestResponse) {
        response.assert_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff");
        response.assert_header(header::X_FRAME_OPTIONS, "DENY");
        response.assert_header(header::REFERRER_POLICY, "no-referrer");
        assert!(!response.header(REQUEST_ID_HEADER).is_empty());
    }

    #[tokio::test]
    async fn panic_response_carries_security_headers() -> anyhow::Result<()> {
        let server = test_server(&MiddlewareConfig::default())?;

        let response = server
            .get("/api/panic")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://story.app"))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_security_headers(&response);
        response.assert_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
        Ok(())
    }

    #[tokio::test]
    async fn timeout_response_carries_security_headers() -> anyhow::Result<()> {
        let middleware = MiddlewareConfig {
            recovery: RecoveryConfig::with_timeout_secs(1),
            ..MiddlewareConfig::default()
        };
        let server = test_server(&middleware)?;

        let response = server.get("/api/slow").await;

        response.assert_status(StatusCode::REQUEST_TIMEOUT);
        assert_security_headers(&response);
        Ok(())
    }
}
