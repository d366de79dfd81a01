//! Invalidation plans.
//!
//! A write to an entity has to purge its exact key and every listing key
//! derived from it. Callers describe that set once per mutation:
//!
//! ```ignore
//! let plan = Invalidation::new()
//!     .key(format!("user_account:{}", uuid))
//!     .pattern("user_accounts:*")?;
//! cache.apply(&plan).await?;
//! ```

use crate::cache::KeyPattern;
use crate::error::Result;

/// Exact keys and patterns to purge after one mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invalidation {
    keys: Vec<String>,
    patterns: Vec<KeyPattern>,
}

impl Invalidation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exact key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }

    /// Adds a pattern, parsed with [`KeyPattern::parse`].
    pub fn pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns.push(KeyPattern::parse(pattern)?);
        Ok(self)
    }

    /// Adds an already parsed pattern.
    pub fn key_pattern(mut self, pattern: KeyPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn patterns(&self) -> &[KeyPattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.patterns.is_empty()
    }
}
