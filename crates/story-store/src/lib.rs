#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for store lifecycle operations.
///
/// Use this target for logging store initialization, loading and persistence.
pub const TRACING_TARGET_CLIENT: &str = "story_store::client";

/// Tracing target for repository queries.
pub const TRACING_TARGET_QUERY: &str = "story_store::queries";

mod client;
mod error;
pub mod model;
pub mod query;

pub use crate::client::{JsonStore, StoreConfig};
pub use crate::error::{StoreError, StoreResult};
