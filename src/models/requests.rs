//! Request DTOs for the admin API

use serde::Deserialize;

use crate::cache::KeyPattern;
use crate::error::{CacheError, Result};

/// Request body for `POST /cache/invalidate`
///
/// # Fields
/// - `pattern`: exact key, `prefix*` or glob with `*` wildcards
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidatePatternRequest {
    pub pattern: String,
}

impl InvalidatePatternRequest {
    /// Parses the pattern, rejecting empty input.
    pub fn validate(&self) -> Result<KeyPattern> {
        if self.pattern.trim().is_empty() {
            return Err(CacheError::InvalidRequest(
                "Pattern cannot be empty".to_string(),
            ));
        }
        KeyPattern::parse(&self.pattern)
    }
}
