//! Error types for authorization decisions
//!
//! Every predicate of the engine returns an explicit outcome. Denials are
//! terminal, deterministic results of the inputs; upstream failures come from
//! the membership store or tenant registry and are passed through unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authorization error types.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthzError {
    /// No principal in context when the action requires one
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Principal or resource is missing or soft-deleted
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad role name, malformed id, or self-targeting
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Resolved role or visibility is insufficient for the action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A collaborator call failed
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),
}

/// Result type for authorization operations.
pub type AuthzResult<T> = Result<T, AuthzError>;

impl AuthzError {
    /// Check if this error is a decision about the inputs rather than a
    /// failure to reach one.
    pub fn is_denial(&self) -> bool {
        !matches!(self, AuthzError::UpstreamFailure(_))
    }

    /// Check if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AuthzError::UpstreamFailure(_))
    }

    /// Get HTTP status code for this error.
    ///
    /// Forbidden maps to 401 so that callers do not leak which resources exist.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthzError::Unauthenticated(_) | AuthzError::Forbidden(_) => 401,
            AuthzError::NotFound(_) => 404,
            AuthzError::InvalidArgument(_) => 400,
            AuthzError::UpstreamFailure(_) => 502,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthzError::Unauthenticated(_) => "UNAUTHENTICATED",
            AuthzError::NotFound(_) => "NOT_FOUND",
            AuthzError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AuthzError::Forbidden(_) => "FORBIDDEN",
            AuthzError::UpstreamFailure(_) => "UPSTREAM_FAILURE",
        }
    }
}
