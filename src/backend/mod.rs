//! Backend Module
//!
//! The storage seam behind the cache service. Values cross this boundary as
//! already-serialized strings.
//!
//! # Implementations
//! - [`LocalBackend`]: in-process store behind an async lock
//! - [`RedisBackend`]: shared store reached over a redis connection manager
//! - [`TieredBackend`]: local L1 in front of any shared L2

mod local;
mod redis_store;
mod tiered;

use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{CacheStats, KeyPattern};
use crate::error::Result;

pub use local::LocalBackend;
pub use redis_store::RedisBackend;
pub use tiered::TieredBackend;

/// Key/value/TTL storage used by [`crate::CacheService`].
///
/// A zero `ttl` stores without expiry. Deletes are idempotent: removing an
/// absent key or matching nothing is not an error.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the stored payload, or None if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Like [`CacheBackend::get`], also returning the remaining lifetime
    /// (None = no expiry, or not reported by this backend).
    async fn get_with_ttl(&self, key: &str) -> Result<Option<(String, Option<Duration>)>> {
        Ok(self.get(key).await?.map(|value| (value, None)))
    }

    /// Inserts or replaces `key`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Removes `key` if present.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Removes every key matching `pattern`, returning how many were removed.
    async fn delete_pattern(&self, pattern: &KeyPattern) -> Result<u64>;

    /// True iff an unexpired entry exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// Counters of the in-process tier, if this backend has one.
    async fn local_stats(&self) -> Option<CacheStats> {
        None
    }

    /// Short name used in logs and the admin surface.
    fn name(&self) -> &'static str;
}
