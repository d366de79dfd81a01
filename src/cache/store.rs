//! Local Cache Module
//!
//! Process-local key/value store with per-entry expiry and an optional LRU
//! capacity bound.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats, KeyPattern, LruTracker};

// == Local Cache ==
/// In-memory store of key -> (serialized value, expiry).
///
/// Expiry is lazy: an expired entry stays in the map until it is read, swept
/// by [`LocalCache::cleanup_expired`], or overwritten, but it is never served.
#[derive(Debug)]
pub struct LocalCache {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    /// 0 = unbounded
    max_entries: usize,
}

impl LocalCache {
    // == Constructor ==
    /// Creates an unbounded store. Entries leave only by expiry or deletion.
    pub fn new() -> Self {
        Self::with_capacity_bound(0)
    }

    /// Creates a store that evicts the least recently used entry once
    /// `max_entries` is reached. `0` disables the bound.
    pub fn with_capacity_bound(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
        }
    }

    // == Set ==
    /// Inserts or replaces `key`, expiring `ttl` from now.
    ///
    /// Overwriting is unconditional and resets the expiry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        let key = key.into();

        if self.max_entries > 0
            && !self.entries.contains_key(&key)
            && self.entries.len() >= self.max_entries
        {
            self.make_room();
        }

        self.entries.insert(key.clone(), CacheEntry::new(value.into(), ttl));
        if self.max_entries > 0 {
            self.lru.touch(&key);
        }
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the value for `key` if present and unexpired.
    ///
    /// An expired entry found here is removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<String> {
        self.get_with_ttl(key).map(|(value, _)| value)
    }

    /// Like [`LocalCache::get`], also returning the remaining lifetime
    /// (None = never expires).
    pub fn get_with_ttl(&mut self, key: &str) -> Option<(String, Option<Duration>)> {
        let now = Instant::now();

        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                let value = entry.value.clone();
                let remaining = entry
                    .expires_at
                    .map(|expires| expires.saturating_duration_since(now));
                self.stats.record_hit();
                if self.max_entries > 0 {
                    self.lru.touch(key);
                }
                Some((value, remaining))
            }
            Some(_) => {
                self.remove_entry(key);
                self.stats.record_expirations(1);
                self.stats.record_miss();
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Has ==
    /// True iff an unexpired entry exists. Does not count as a read.
    pub fn has(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    // == Delete ==
    /// Removes `key`. Returns whether an entry was removed; absent keys are a
    /// no-op.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        if removed {
            self.stats.record_invalidations(1);
        }
        removed
    }

    // == Delete By Pattern ==
    /// Removes every key matching `pattern` with a full scan.
    ///
    /// Returns the number of entries removed.
    pub fn delete_by_pattern(&mut self, pattern: &KeyPattern) -> usize {
        if let KeyPattern::Exact(key) = pattern {
            return usize::from(self.delete(key));
        }

        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.matches(key))
            .cloned()
            .collect();

        for key in &matching {
            self.remove_entry(key);
        }

        self.stats.record_invalidations(matching.len());
        matching.len()
    }

    // == Cleanup Expired ==
    /// Physically removes every expired entry.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }

        self.stats.record_expirations(expired.len());
        expired.len()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.stats.record_invalidations(count);
        self.stats.set_total_entries(0);
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Frees one slot: expired entries go first, then the LRU entry.
    fn make_room(&mut self) {
        if self.cleanup_expired() > 0 {
            return;
        }
        if let Some(evicted) = self.lru.evict_oldest() {
            self.entries.remove(&evicted);
            self.stats.record_eviction();
        }
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_store_new() {
        let store = LocalCache::new();
        assert!(store.is_empty());
        assert_eq!(store.max_entries(), 0);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = LocalCache::new();

        store.set("key1", "value1", TTL);

        assert_eq!(store.get("key1").as_deref(), Some("value1"));
        assert!(store.has("key1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = LocalCache::new();
        assert_eq!(store.get("nonexistent"), None);
        assert!(!store.has("nonexistent"));
    }

    #[test]
    fn test_store_overwrite_replaces_value() {
        let mut store = LocalCache::new();

        store.set("key1", "value1", TTL);
        store.set("key1", "value2", TTL);

        assert_eq!(store.get("key1").as_deref(), Some("value2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_delete_is_idempotent() {
        let mut store = LocalCache::new();

        store.set("key1", "value1", TTL);

        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));
        assert!(!store.delete("never_set"));
        assert_eq!(store.get("key1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_ttl_boundary() {
        let mut store = LocalCache::new();

        store.set("key1", "value1", Duration::from_secs(600));

        tokio::time::advance(Duration::from_millis(599_999)).await;
        assert_eq!(store.get("key1").as_deref(), Some("value1"));

        tokio::time::advance(Duration::from_millis(2)).await;
        assert!(!store.has("key1"));
        assert_eq!(store.get("key1"), None);
        assert!(store.is_empty(), "Expired entry should be purged on read");
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_get_with_ttl() {
        let mut store = LocalCache::new();
        store.set("bounded", "v", Duration::from_secs(10));
        store.set("forever", "v", Duration::ZERO);

        tokio::time::advance(Duration::from_secs(3)).await;

        assert_eq!(
            store.get_with_ttl("bounded"),
            Some(("v".to_string(), Some(Duration::from_secs(7))))
        );
        assert_eq!(store.get_with_ttl("forever"), Some(("v".to_string(), None)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_accepts_huge_ttl() {
        let mut store = LocalCache::new();
        store.set("user_account:1", "v", Duration::from_secs(u64::MAX));

        tokio::time::advance(Duration::from_secs(86_400 * 365)).await;

        assert_eq!(store.get_with_ttl("user_account:1"), Some(("v".to_string(), None)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_overwrite_resets_expiry() {
        let mut store = LocalCache::new();

        store.set("key1", "old", Duration::from_secs(10));
        tokio::time::advance(Duration::from_secs(8)).await;
        store.set("key1", "new", Duration::from_secs(10));
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(store.get("key1").as_deref(), Some("new"));
    }

    #[test]
    fn test_store_delete_by_pattern() {
        let mut store = LocalCache::new();

        store.set("user_accounts:all", "[]", TTL);
        store.set("user_accounts:list:1:10:updatedAt:desc", "[]", TTL);
        store.set("user_account:abc", "{}", TTL);

        let removed = store.delete_by_pattern(&KeyPattern::parse("user_accounts:*").unwrap());

        assert_eq!(removed, 2);
        assert!(!store.has("user_accounts:all"));
        assert!(!store.has("user_accounts:list:1:10:updatedAt:desc"));
        assert!(store.has("user_account:abc"));
    }

    #[test]
    fn test_store_delete_by_pattern_no_match() {
        let mut store = LocalCache::new();
        store.set("user_account:abc", "{}", TTL);

        let removed = store.delete_by_pattern(&KeyPattern::prefix("orders:"));

        assert_eq!(removed, 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_cleanup_expired() {
        let mut store = LocalCache::new();

        store.set("short", "v", Duration::from_secs(1));
        store.set("long", "v", Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.has("long"));
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_unbounded_by_default() {
        let mut store = LocalCache::new();

        for i in 0..5_000 {
            store.set(format!("key{}", i), "v", TTL);
        }

        assert_eq!(store.len(), 5_000);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_capacity_bound_evicts_lru() {
        let mut store = LocalCache::with_capacity_bound(3);

        store.set("key1", "value1", TTL);
        store.set("key2", "value2", TTL);
        store.set("key3", "value3", TTL);

        // key1 becomes most recently used, so key2 is evicted next
        store.get("key1");
        store.set("key4", "value4", TTL);

        assert_eq!(store.len(), 3);
        assert!(store.has("key1"));
        assert!(!store.has("key2"));
        assert!(store.has("key4"));
        assert_eq!(store.stats().evictions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_capacity_bound_prefers_expired() {
        let mut store = LocalCache::with_capacity_bound(2);

        store.set("stale", "v", Duration::from_secs(1));
        store.set("fresh", "v", TTL);
        tokio::time::advance(Duration::from_secs(2)).await;

        store.set("newcomer", "v", TTL);

        assert!(store.has("fresh"));
        assert!(store.has("newcomer"));
        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_stats() {
        let mut store = LocalCache::new();

        store.set("key1", "value1", TTL);
        store.get("key1");
        store.get("nonexistent");
        store.delete("key1");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.invalidations, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_store_clear() {
        let mut store = LocalCache::with_capacity_bound(10);
        store.set("a", "1", TTL);
        store.set("b", "2", TTL);

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.stats().invalidations, 2);
    }
}
