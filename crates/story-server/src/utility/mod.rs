//! Utility modules for common functionality across the crate.

pub mod tracing_targets;

/// Maximum accepted request body size in bytes.
pub const MAX_BODY_SIZE: usize = 1_000_000;
