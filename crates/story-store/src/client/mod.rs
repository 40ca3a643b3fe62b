//! File-backed store handle and its configuration.

mod json_store;
mod store_config;

pub use json_store::JsonStore;
pub use store_config::StoreConfig;
