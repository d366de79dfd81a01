//! Cache Layer Service
//!
//! The cache-aside facade application code talks to: `get_or_load` for
//! reads, `invalidate` / `invalidate_pattern` / `apply` after writes.
//!
//! # Known race
//! A load that read stale data before an invalidation can still store that
//! data after the invalidation ran. Last writer wins per key; the entry's TTL
//! bounds how long such a value survives.

mod invalidation;
mod single_flight;

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::backend::CacheBackend;
use crate::cache::KeyPattern;
use crate::error::{CacheError, Result};

pub use invalidation::Invalidation;
pub use single_flight::SingleFlight;

// == Failure Policy ==
/// What `get_or_load` does when the backing store fails.
///
/// Invalidation failures are reported under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Skip the cache, serve straight from the loader and log a warning
    #[default]
    Bypass,
    /// Return `CacheError::BackendUnavailable` to the caller
    Fail,
}

impl FromStr for FailurePolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bypass" => Ok(FailurePolicy::Bypass),
            "fail" => Ok(FailurePolicy::Fail),
            other => Err(CacheError::InvalidRequest(format!(
                "unknown failure policy '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Bypass => write!(f, "bypass"),
            FailurePolicy::Fail => write!(f, "fail"),
        }
    }
}

// == Service Stats ==
/// Snapshot of the service counters.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ServiceStats {
    pub hits: u64,
    pub misses: u64,
    /// Loader invocations
    pub loads: u64,
    /// Loader invocations that returned an error
    pub load_failures: u64,
    /// Backend failures absorbed by the bypass policy
    pub degraded: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
    degraded: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ServiceStats {
        ServiceStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
        }
    }
}

enum Lookup<T> {
    Hit(T),
    Miss,
    /// Backend failed and the bypass policy applies
    Bypass,
}

// == Cache Service ==
/// Read-through cache over an injected [`CacheBackend`].
///
/// Cheap to clone; clones share the backend, counters and in-flight table.
#[derive(Clone)]
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
    policy: FailurePolicy,
    flights: Option<Arc<SingleFlight>>,
    counters: Arc<Counters>,
}

impl CacheService {
    /// Creates a service with the bypass policy and no load coalescing.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            policy: FailurePolicy::default(),
            flights: None,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enables or disables coalescing of concurrent misses on one key.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.flights = enabled.then(|| Arc::new(SingleFlight::new()));
        self
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn single_flight_enabled(&self) -> bool {
        self.flights.is_some()
    }

    // == Get Or Load ==
    /// Returns the cached value for `key`, or runs `loader`, caches its
    /// result for `ttl` and returns it.
    ///
    /// The loader's error is returned unchanged and nothing is cached for
    /// it. Cache-side failures reach the caller through `E: From<CacheError>`
    /// when the policy is [`FailurePolicy::Fail`]; under
    /// [`FailurePolicy::Bypass`] a failing backend only costs the cache.
    /// Dropping the returned future before it completes caches nothing.
    pub async fn get_or_load<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        match self.lookup::<T>(key).await? {
            Lookup::Hit(value) => {
                Counters::bump(&self.counters.hits);
                debug!(key = %key, "Cache hit");
                return Ok(value);
            }
            Lookup::Bypass => return self.run_loader(key, loader).await,
            Lookup::Miss => {
                Counters::bump(&self.counters.misses);
                debug!(key = %key, "Cache miss");
            }
        }

        let _flight = match &self.flights {
            Some(flights) => {
                let guard = flights.acquire(key).await;
                // a caller ahead of us may have filled the key while we waited
                if let Lookup::Hit(value) = self.lookup::<T>(key).await? {
                    debug!(key = %key, "Cache filled by concurrent load");
                    return Ok(value);
                }
                Some(guard)
            }
            None => None,
        };

        let value = self.run_loader(key, loader).await?;
        self.store(key, &value, ttl).await?;
        Ok(value)
    }

    // == Get ==
    /// Reads `key` without loading. Backend and decoding errors are returned
    /// as errors, never as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, raw, ttl).await
    }

    /// True iff an unexpired entry exists for `key`.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        self.backend.exists(key).await
    }

    // == Invalidate ==
    /// Removes `key`. Absent keys are not an error.
    pub async fn invalidate(&self, key: &str) -> Result<()> {
        self.backend
            .delete(key)
            .await
            .map_err(|e| CacheError::invalidation(key, e))?;
        debug!(key = %key, "Invalidated key");
        Ok(())
    }

    /// Removes every key matching `pattern` (e.g. `"user_accounts:*"`),
    /// returning how many were removed.
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<u64> {
        let pattern = KeyPattern::parse(pattern)?;
        self.invalidate_key_pattern(&pattern).await
    }

    pub async fn invalidate_key_pattern(&self, pattern: &KeyPattern) -> Result<u64> {
        let removed = self
            .backend
            .delete_pattern(pattern)
            .await
            .map_err(|e| CacheError::invalidation(pattern.to_string(), e))?;
        debug!(pattern = %pattern, removed, "Invalidated pattern");
        Ok(removed)
    }

    /// Runs every target of `plan`. All targets are attempted; the first
    /// failure is returned.
    pub async fn apply(&self, plan: &Invalidation) -> Result<()> {
        let mut first_error = None;

        for key in plan.keys() {
            if let Err(e) = self.invalidate(key).await {
                warn!(key = %key, error = %e, "Invalidation failed");
                first_error.get_or_insert(e);
            }
        }
        for pattern in plan.patterns() {
            if let Err(e) = self.invalidate_key_pattern(pattern).await {
                warn!(pattern = %pattern, error = %e, "Pattern invalidation failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub async fn ping(&self) -> Result<()> {
        self.backend.ping().await
    }

    pub fn stats(&self) -> ServiceStats {
        self.counters.snapshot()
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<Lookup<T>> {
        match self.backend.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(Lookup::Hit(value)),
                Err(e) => {
                    // e.g. written by an older build with another shape
                    warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                    if let Err(e) = self.backend.delete(key).await {
                        warn!(key = %key, error = %e, "Failed to discard undecodable entry");
                    }
                    Ok(Lookup::Miss)
                }
            },
            Ok(None) => Ok(Lookup::Miss),
            Err(e) => self.degrade(key, e).map(|()| Lookup::Bypass),
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        match self.backend.set(key, raw, ttl).await {
            Ok(()) => Ok(()),
            Err(e) => self.degrade(key, e),
        }
    }

    async fn run_loader<T, E, F, Fut>(&self, key: &str, loader: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        Counters::bump(&self.counters.loads);
        let result = loader().await;
        if result.is_err() {
            Counters::bump(&self.counters.load_failures);
            debug!(key = %key, "Loader failed; nothing cached");
        }
        result
    }

    /// Applies the failure policy to a backend error.
    fn degrade(&self, key: &str, err: CacheError) -> Result<()> {
        match self.policy {
            FailurePolicy::Fail => Err(err),
            FailurePolicy::Bypass => {
                Counters::bump(&self.counters.degraded);
                warn!(
                    key = %key,
                    backend = self.backend.name(),
                    error = %err,
                    "Backing store failed; serving without cache"
                );
                Ok(())
            }
        }
    }
}

impl fmt::Debug for CacheService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheService")
            .field("backend", &self.backend.name())
            .field("policy", &self.policy)
            .field("single_flight", &self.flights.is_some())
            .finish()
    }
}
