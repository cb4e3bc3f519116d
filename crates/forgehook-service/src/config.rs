//! # Service Configuration
//!
//! Layered configuration of the dispatch service binary. Every field
//! carries a serde default, so an entirely unconfigured environment yields
//! a valid configuration; malformed operator input is a hard error.

use forgehook_dispatch::DispatchConfig;
use serde::{Deserialize, Serialize};

/// Failure of configuration validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// Top-level configuration of the service binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Public base URL of the instance, used inside payload links.
    #[serde(default = "ServiceConfig::default_base_url")]
    pub base_url: String,

    /// Event consumption tuning.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl ServiceConfig {
    fn default_base_url() -> String {
        "http://localhost:3000".to_string()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Invalid {
                message: "base_url must not be empty".to_string(),
            });
        }

        if self.dispatch.concurrency == 0 {
            return Err(ConfigError::Invalid {
                message: "dispatch.concurrency must be at least 1".to_string(),
            });
        }

        if self.dispatch.max_delivery_attempts == 0 {
            return Err(ConfigError::Invalid {
                message: "dispatch.max_delivery_attempts must be at least 1".to_string(),
            });
        }

        if self.dispatch.max_backoff_ms < self.dispatch.initial_backoff_ms {
            return Err(ConfigError::Invalid {
                message: "dispatch.max_backoff_ms must not undercut initial_backoff_ms"
                    .to_string(),
            });
        }

        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            dispatch: DispatchConfig::default(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
