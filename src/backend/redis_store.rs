//! Redis backend
//!
//! Shared store reached through a `ConnectionManager`, which reconnects on its
//! own; each call clones the manager handle. Redis gives linearizable
//! single-key reads and writes, and nothing stronger is assumed here.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, info};

use super::CacheBackend;
use crate::cache::KeyPattern;
use crate::error::{CacheError, Result};

/// Keys requested per `SCAN` round trip during pattern deletes.
const SCAN_BATCH: usize = 500;

/// Cache backend over a shared redis instance.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Opens a connection manager for `url` and verifies it with `PING`.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(|e| {
            CacheError::BackendUnavailable(format!("Failed to create Redis client: {}", e))
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::BackendUnavailable(format!(
                "Failed to create Redis connection manager: {}",
                e
            ))
        })?;

        let backend = Self::new(conn);
        backend.ping().await?;
        info!(url = %url, "Connected to redis backing store");
        Ok(backend)
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn get_with_ttl(&self, key: &str) -> Result<Option<(String, Option<Duration>)>> {
        let mut conn = self.conn.clone();
        let (value, pttl): (Option<String>, i64) = redis::pipe()
            .atomic()
            .get(key)
            .pttl(key)
            .query_async(&mut conn)
            .await?;

        // PTTL: -1 = no expiry, -2 = missing
        let remaining = u64::try_from(pttl).ok().map(Duration::from_millis);
        Ok(value.map(|value| (value, remaining)))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        if ttl.is_zero() {
            let _: () = conn.set(key, value).await?;
        } else {
            let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
            let _: () = conn.pset_ex(key, value, millis).await?;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(key).await?;
        debug!(key = %key, removed, "Redis delete");
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &KeyPattern) -> Result<u64> {
        if let KeyPattern::Exact(key) = pattern {
            let mut conn = self.conn.clone();
            let removed: u64 = conn.del(key).await?;
            return Ok(removed);
        }

        let glob = pattern.to_redis_glob();
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        // SCAN may return a key more than once; DEL of an already deleted
        // key counts 0, so the total stays exact.
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&glob)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let deleted: u64 = conn.del(&keys).await?;
                removed += deleted;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(pattern = %glob, removed, "Redis pattern delete");
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                CacheError::BackendUnavailable(format!("Redis health check failed: {}", e))
            })?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
