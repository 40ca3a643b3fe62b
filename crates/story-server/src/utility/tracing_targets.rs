//! Centralized tracing target constants for structured logging.
//!
//! Consistent targets allow fine-grained filtering via `RUST_LOG`, for example
//! `RUST_LOG=story_server::authentication=debug`.

/// Signup, login and guest session issuance.
pub const AUTHENTICATION: &str = "story_server::authentication";

/// Password hashing and verification operations.
pub const PASSWORD_HASHER: &str = "story_server::password_hasher";

/// Session secret management and token signing.
pub const SESSION_KEYS: &str = "story_server::session_keys";

/// HTTP handlers.
pub const HANDLER: &str = "story_server::handler";

/// Request extraction and rejection.
pub const EXTRACT: &str = "story_server::extract";

/// Error recovery including middleware errors and request timeouts.
pub const RECOVERY_ERROR: &str = "story_server::recovery::error";

/// Panic recovery.
pub const RECOVERY_PANIC: &str = "story_server::recovery::panic";
