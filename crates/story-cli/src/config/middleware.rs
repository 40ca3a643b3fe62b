//! Middleware configuration for the HTTP server.
//!
//! CORS and recovery settings are defined in `story-server` and support both
//! CLI arguments and environment variables.
//!
//! ```bash
//! story-cli --allowed-origins "https://story.app" --request-timeout 60
//! ```

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};
use story_server::middleware::{CorsConfig, RecoveryConfig};

use super::TRACING_TARGET_CONFIG;

/// Middleware configuration combining CORS and recovery settings.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// CORS (Cross-Origin Resource Sharing) configuration.
    #[clap(flatten)]
    pub cors: CorsConfig,

    /// Request timeout and panic recovery configuration.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Rejects timeouts outside 1-300 seconds.
    pub fn validate(&self) -> AnyhowResult<()> {
        let timeout = self.recovery.request_timeout;
        if timeout == 0 || timeout > 300 {
            return Err(anyhow!(
                "Request timeout {timeout} seconds is invalid. Must be between 1 and 300 seconds."
            ));
        }

        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            origins = ?self.cors.allowed_origins,
            credentials = self.cors.allow_credentials,
            max_age_secs = self.cors.max_age_seconds,
            "CORS configuration"
        );

        if self.cors.allow_credentials && self.cors.allowed_origins.is_empty() {
            tracing::warn!(
                target: TRACING_TARGET_CONFIG,
                "CORS credentials ignored without explicit origins"
            );
        }

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            "Recovery configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(MiddlewareConfig::default().validate().is_ok());
    }

    #[test]
    fn reject_invalid_request_timeouts() {
        let mut config = MiddlewareConfig::default();

        config.recovery = RecoveryConfig::with_timeout_secs(0);
        assert!(config.validate().is_err());

        config.recovery = RecoveryConfig::with_timeout_secs(301);
        assert!(config.validate().is_err());

        config.recovery = RecoveryConfig::with_timeout_secs(5);
        assert!(config.validate().is_ok());
    }
}
