//! Tiered backend
//!
//! - L1: [`LocalBackend`] in this process (fast, not shared)
//! - L2: any shared backend, normally [`super::RedisBackend`]
//!
//! L1 copies live at most `l1_ttl`, which bounds how long this process can
//! serve a value another process has already invalidated in L2.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{CacheBackend, LocalBackend};
use crate::cache::{CacheStats, KeyPattern};
use crate::error::Result;

/// Local L1 in front of a shared L2.
#[derive(Clone)]
pub struct TieredBackend {
    l1: LocalBackend,
    l2: Arc<dyn CacheBackend>,
    l1_ttl: Duration,
}

impl TieredBackend {
    pub fn new(l1: LocalBackend, l2: Arc<dyn CacheBackend>, l1_ttl: Duration) -> Self {
        Self { l1, l2, l1_ttl }
    }

    /// The in-process tier, e.g. for the background expiry sweep.
    pub fn l1(&self) -> &LocalBackend {
        &self.l1
    }

    /// TTL for an L1 copy of an entry stored with `ttl`.
    fn l1_ttl_for(&self, ttl: Duration) -> Duration {
        if ttl.is_zero() || self.l1_ttl.is_zero() {
            // one of the two is "no expiry"; the other one bounds the copy
            ttl.max(self.l1_ttl)
        } else {
            ttl.min(self.l1_ttl)
        }
    }
}

#[async_trait]
impl CacheBackend for TieredBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(value) = self.l1.get(key).await? {
            debug!(key = %key, "Cache hit in L1");
            return Ok(Some(value));
        }

        match self.l2.get_with_ttl(key).await? {
            Some((value, remaining)) => {
                debug!(key = %key, "Cache hit in L2");
                let backfill = match remaining {
                    // under 1ms left in L2; any local copy would outlive it
                    Some(left) if left.is_zero() => None,
                    Some(left) => Some(self.l1_ttl_for(left)),
                    None => Some(self.l1_ttl_for(Duration::ZERO)),
                };
                if let Some(ttl) = backfill {
                    self.l1.set(key, value.clone(), ttl).await?;
                }
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        // L2 first: a failed shared write must not leave a local-only copy
        self.l2.set(key, value.clone(), ttl).await?;
        self.l1.set(key, value, self.l1_ttl_for(ttl)).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.l1.delete(key).await?;
        self.l2.delete(key).await.inspect_err(|e| {
            warn!(key = %key, error = %e, "L2 delete failed after L1 purge");
        })
    }

    async fn delete_pattern(&self, pattern: &KeyPattern) -> Result<u64> {
        let local = self.l1.delete_pattern(pattern).await?;
        let shared = self.l2.delete_pattern(pattern).await.inspect_err(|e| {
            warn!(pattern = %pattern, error = %e, "L2 pattern delete failed after L1 purge");
        })?;
        Ok(local.max(shared))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        if self.l1.exists(key).await? {
            return Ok(true);
        }
        self.l2.exists(key).await
    }

    async fn ping(&self) -> Result<()> {
        self.l2.ping().await
    }

    async fn local_stats(&self) -> Option<CacheStats> {
        self.l1.local_stats().await
    }

    fn name(&self) -> &'static str {
        "tiered"
    }
}
