//! Cache Module
//!
//! In-process building blocks: entries with TTL, the local store, the key
//! pattern language and the optional LRU bound.

mod entry;
mod lru;
mod pattern;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use pattern::KeyPattern;
pub use stats::CacheStats;
pub use store::LocalCache;
