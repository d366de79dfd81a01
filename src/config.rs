//! Configuration Module
//!
//! Loads cache layer settings from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CacheError;
use crate::service::FailurePolicy;

// == Backend Kind ==
/// Which store backs the cache service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// In-process store only
    #[default]
    Local,
    /// In-process L1 in front of redis
    Tiered,
    /// Redis only
    Redis,
}

impl FromStr for BackendKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "tiered" => Ok(BackendKind::Tiered),
            "redis" => Ok(BackendKind::Redis),
            other => Err(CacheError::InvalidRequest(format!(
                "unknown cache backend '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Local => "local",
            BackendKind::Tiered => "tiered",
            BackendKind::Redis => "redis",
        };
        write!(f, "{}", name)
    }
}

// == Cache TTLs ==
/// TTL per key category, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// `user_account:{uuid}`
    pub user_account: u64,
    /// `user_accounts:all`
    pub all_user_accounts: u64,
    /// `user_accounts:list:...`
    pub user_accounts_list: u64,
}

impl CacheTtls {
    pub fn user_account(&self) -> Duration {
        Duration::from_secs(self.user_account)
    }

    pub fn all_user_accounts(&self) -> Duration {
        Duration::from_secs(self.all_user_accounts)
    }

    pub fn user_accounts_list(&self) -> Duration {
        Duration::from_secs(self.user_accounts_list)
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            user_account: 600,
            all_user_accounts: 300,
            user_accounts_list: 180,
        }
    }
}

/// Cache layer configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendKind,
    pub redis_url: String,
    /// LRU bound for the in-process store, 0 = unbounded
    pub max_entries: usize,
    /// Upper bound in seconds for L1 copies in the tiered backend
    pub l1_ttl: u64,
    /// Background expiry sweep interval in seconds, at least 1
    pub cleanup_interval: u64,
    /// Admin HTTP port
    pub server_port: u16,
    pub single_flight: bool,
    pub failure_policy: FailurePolicy,
    pub ttls: CacheTtls,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `local`, `tiered` or `redis` (default: local)
    /// - `REDIS_URL` - Shared store URL (default: redis://127.0.0.1:6379)
    /// - `MAX_ENTRIES` - Local LRU bound, 0 = unbounded (default: 0)
    /// - `L1_TTL` - Max lifetime of L1 copies in seconds (default: 60)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds, min 1 (default: 30)
    /// - `SERVER_PORT` - Admin HTTP port (default: 3000)
    /// - `SINGLE_FLIGHT` - Coalesce concurrent misses (default: false)
    /// - `BACKEND_FAILURE_POLICY` - `bypass` or `fail` (default: bypass)
    /// - `TTL_USER_ACCOUNT` / `TTL_ALL_USER_ACCOUNTS` / `TTL_USER_ACCOUNTS_LIST`
    ///   (defaults: 600 / 300 / 180)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: env_or("CACHE_BACKEND", defaults.backend),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            l1_ttl: env_or("L1_TTL", defaults.l1_ttl),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval).max(1),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            single_flight: env_or("SINGLE_FLIGHT", defaults.single_flight),
            failure_policy: env_or("BACKEND_FAILURE_POLICY", defaults.failure_policy),
            ttls: CacheTtls {
                user_account: env_or("TTL_USER_ACCOUNT", defaults.ttls.user_account),
                all_user_accounts: env_or(
                    "TTL_ALL_USER_ACCOUNTS",
                    defaults.ttls.all_user_accounts,
                ),
                user_accounts_list: env_or(
                    "TTL_USER_ACCOUNTS_LIST",
                    defaults.ttls.user_accounts_list,
                ),
            },
        }
    }

    pub fn l1_ttl(&self) -> Duration {
        Duration::from_secs(self.l1_ttl)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            max_entries: 0,
            l1_ttl: 60,
            cleanup_interval: 30,
            server_port: 3000,
            single_flight: false,
            failure_policy: FailurePolicy::Bypass,
            ttls: CacheTtls::default(),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
