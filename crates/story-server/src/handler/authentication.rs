//! Signup, login and guest session handlers.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;

use crate::extract::Json;
use crate::handler::Result;
use crate::handler::request::{LoginRequest, SignupRequest};
use crate::handler::response::AuthResponse;
use crate::service::{AuthService, ServiceState};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "story_server::handler::authentication";

/// Registers a new account and returns a session for it.
#[tracing::instrument(skip_all)]
async fn signup(
    State(auth_service): State<AuthService>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    tracing::debug!(target: TRACING_TARGET, "Signup requested");

    let session = auth_service.signup(request.into()).await?;

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %session.profile.id,
        "Account registered"
    );

    Ok((StatusCode::CREATED, Json(AuthResponse::from(session))))
}

/// Authenticates with email and password.
#[tracing::instrument(skip_all)]
async fn login(
    State(auth_service): State<AuthService>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    tracing::debug!(target: TRACING_TARGET, "Login requested");

    let session = auth_service.login(request.into()).await?;
    Ok(Json(AuthResponse::from(session)))
}

/// Issues a guest session. Any request body is ignored.
#[tracing::instrument(skip_all)]
async fn guest(State(auth_service): State<AuthService>) -> Result<Json<AuthResponse>> {
    let session = auth_service.guest_login()?;
    Ok(Json(AuthResponse::from(session)))
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/guest", post(guest))
}
