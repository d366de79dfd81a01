//! Local backend
//!
//! Puts a [`LocalCache`] behind a tokio `RwLock` so it can be shared between
//! request tasks. Every mutating call takes the single write lock; reads take
//! it too because a read may purge an expired entry and updates counters.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::CacheBackend;
use crate::cache::{CacheStats, KeyPattern, LocalCache};
use crate::error::Result;

/// Cloneable handle to a shared in-process store.
#[derive(Debug, Clone, Default)]
pub struct LocalBackend {
    store: Arc<RwLock<LocalCache>>,
}

impl LocalBackend {
    /// Creates a backend over an unbounded store.
    pub fn new() -> Self {
        Self::from_store(LocalCache::new())
    }

    /// Creates a backend with an LRU bound, `0` meaning unbounded.
    pub fn with_capacity_bound(max_entries: usize) -> Self {
        Self::from_store(LocalCache::with_capacity_bound(max_entries))
    }

    pub fn from_store(store: LocalCache) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Physically removes expired entries, returning how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.store.write().await.clear();
    }
}

#[async_trait]
impl CacheBackend for LocalBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.store.write().await.get(key))
    }

    async fn get_with_ttl(&self, key: &str) -> Result<Option<(String, Option<Duration>)>> {
        Ok(self.store.write().await.get_with_ttl(key))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.store.write().await.set(key, value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let removed = self.store.write().await.delete(key);
        debug!(key = %key, removed, "Local delete");
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &KeyPattern) -> Result<u64> {
        let removed = self.store.write().await.delete_by_pattern(pattern);
        debug!(pattern = %pattern, removed, "Local pattern delete");
        Ok(removed as u64)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.store.read().await.has(key))
    }

    async fn local_stats(&self) -> Option<CacheStats> {
        Some(self.store.read().await.stats())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
