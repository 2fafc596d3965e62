//! Engine configuration.
//!
//! Controls how the loader pages through the membership store and how deep it
//! follows group chains. Configuration is loaded from environment variables
//! with defaults suitable for local development.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Configuration for the authorization engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of items requested per store page.
    pub page_size: u32,

    /// Maximum pages fetched for a single listing before the store is
    /// considered broken.
    pub max_pages: u32,

    /// Maximum number of group hops followed from a principal.
    pub max_group_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: 1000,
            max_group_depth: 32,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `AUTHZ_PAGE_SIZE`: Items per store page (default: 100)
    /// - `AUTHZ_MAX_PAGES`: Page limit per listing (default: 1000)
    /// - `AUTHZ_MAX_GROUP_DEPTH`: Group hops followed (default: 32)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            page_size: std::env::var("AUTHZ_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.page_size),
            max_pages: std::env::var("AUTHZ_MAX_PAGES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_pages),
            max_group_depth: std::env::var("AUTHZ_MAX_GROUP_DEPTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_group_depth),
        }
    }

    /// Validate that every limit is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "page_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_pages == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_pages".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_group_depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_group_depth".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
