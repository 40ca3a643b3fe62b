//! HTTP listener and graceful shutdown.

mod http_server;

pub use http_server::serve;
