//! Cache Layer - read-through caching for a data-access layer
//!
//! A cache-aside service (`get_or_load`, `invalidate`, `invalidate_pattern`)
//! over a pluggable backend: an in-process TTL store, a shared redis store,
//! or both tiered.

pub mod accounts;
pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use backend::{CacheBackend, LocalBackend, RedisBackend, TieredBackend};
pub use cache::{KeyPattern, LocalCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use service::{CacheService, FailurePolicy, Invalidation, ServiceStats};
pub use tasks::spawn_cleanup_task;
