//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod authentication;
mod error;
mod request;
mod response;

use std::path::Path;

use axum::Router;
use axum::response::{IntoResponse, Response};
use tower_http::services::ServeDir;

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::{LoginRequest, SignupRequest};
pub use crate::handler::response::{AuthResponse, ErrorResponse, UserResponse};
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

#[inline]
async fn api_handler() -> Response {
    ErrorKind::NotFound
        .with_message("API route not found.")
        .into_response()
}

/// Returns a [`Router`] with all API routes, answering unknown paths and
/// methods with a JSON 404.
fn api_routes() -> Router<ServiceState> {
    Router::new()
        .merge(authentication::routes())
        .method_not_allowed_fallback(api_handler)
        .fallback(api_handler)
}

/// Returns a [`Router`] with all routes.
///
/// API routes live under `/api`. Other paths are served from `static_dir`
/// when given, with `index.html` served for directories.
pub fn routes(static_dir: Option<&Path>) -> Router<ServiceState> {
    let router = Router::new().nest("/api", api_routes());

    match static_dir {
        Some(static_dir) => router.fallback_service(ServeDir::new(static_dir)),
        None => router.fallback(handler),
    }
}

#[cfg(test)]
pub(crate) mod test {
    use axum::Router;
    use axum_test::TestServer;
    use story_store::{JsonStore, StoreConfig};
    use tempfile::TempDir;

    use crate::handler::routes;
    use crate::service::{ServiceState, SessionKeys};

    /// Returns fresh state backed by a temporary store.
    pub async fn create_test_state() -> anyhow::Result<(ServiceState, TempDir)> {
        let temp_dir = TempDir::new()?;
        let store = JsonStore::open(StoreConfig::new(temp_dir.path().join("users.json"))).await?;
        let state = ServiceState::new(store, SessionKeys::ephemeral());
        Ok((state, temp_dir))
    }

    /// Returns a new [`TestServer`] with the given router.
    ///
    /// The temporary directory must outlive the server.
    pub async fn create_test_server_with_router(
        router: impl Fn(ServiceState) -> Router<ServiceState>,
    ) -> anyhow::Result<(TestServer, ServiceState, TempDir)> {
        let (state, temp_dir) = create_test_state().await?;
        let app = router(state.clone()).with_state(state.clone());
        let server = TestServer::new(app)?;
        Ok((server, state, temp_dir))
    }

    /// Returns a new [`TestServer`] with the default router.
    pub async fn create_test_server() -> anyhow::Result<(TestServer, ServiceState, TempDir)> {
        create_test_server_with_router(|_| routes(None)).await
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let (server, _state, _temp_dir) = create_test_server().await?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_api_route() -> anyhow::Result<()> {
        let (server, _state, _temp_dir) = create_test_server().await?;

        let response = server.get("/api/posts").await;
        response.assert_status_not_found();
        response.assert_json(&serde_json::json!({
            "name": "not_found",
            "message": "API route not found.",
        }));

        server.get("/api/auth/signup").await.assert_status_not_found();
        Ok(())
    }

    #[tokio::test]
    async fn serves_static_directory() -> anyhow::Result<()> {
        let static_dir = TempDir::new()?;
        std::fs::write(static_dir.path().join("index.html"), "<h1>Story</h1>")?;

        let path = static_dir.path().to_path_buf();
        let (server, _state, _temp_dir) =
            create_test_server_with_router(move |_| routes(Some(&path))).await?;

        let response = server.get("/").await;
        response.assert_status_ok();
        response.assert_text("<h1>Story</h1>");

        server.get("/missing.js").await.assert_status_not_found();
        server.get("/api/unknown").await.assert_status_not_found();
        Ok(())
    }
}
