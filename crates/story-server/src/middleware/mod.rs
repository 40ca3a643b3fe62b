//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Security: CORS, security headers, preflight handling, body limits
//! - Observability: tracing spans and request IDs
//! - Recovery: panics, timeouts and middleware errors
//!
//! ```rust,no_run
//! use axum::Router;
//! use story_server::middleware::{
//!     RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
//! };
//!
//! let app: Router = Router::new()
//!     .with_default_recovery()
//!     .with_default_security()
//!     .with_observability();
//! ```

mod observability;
mod recovery;
mod security;

pub use observability::{REQUEST_ID_HEADER, RouterObservabilityExt};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{CorsConfig, FrameOptions, ReferrerPolicy, RouterSecurityExt, SecurityHeadersConfig};
