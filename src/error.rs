//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the cache layer itself.
///
/// Loader failures are not represented here: `get_or_load` hands the
/// loader's own error back to the caller unchanged.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The shared backing store could not be reached or rejected a command
    #[error("Backing store unavailable: {0}")]
    BackendUnavailable(String),

    /// A delete or pattern delete against the backing store failed
    #[error("Invalidation of '{target}' failed: {reason}")]
    Invalidation { target: String, reason: String },

    /// A value could not be encoded for storage
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed invalidation pattern
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Invalid admin request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CacheError {
    /// Wraps a backend failure raised while invalidating `target`.
    pub fn invalidation(target: impl Into<String>, source: CacheError) -> Self {
        let reason = match source {
            CacheError::BackendUnavailable(reason) => reason,
            other => other.to_string(),
        };
        CacheError::Invalidation {
            target: target.into(),
            reason,
        }
    }

    /// True for failures of the backing store, as opposed to caller mistakes.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            CacheError::BackendUnavailable(_) | CacheError::Invalidation { .. }
        )
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::BackendUnavailable(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Invalidation { .. } => StatusCode::BAD_GATEWAY,
            CacheError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::InvalidPattern(_) | CacheError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
