//! Accounts Module
//!
//! The user-account data-access layer as a cache consumer: key conventions,
//! the cached record shapes and a repository that reads through the cache
//! and invalidates after writes.

pub mod keys;
mod model;
mod repository;

pub use model::{ListQuery, LoginType, OrderDirection, Page, PageMeta, UpdateAccount, UserAccount};
pub use repository::{AccountError, AccountStore, CachedAccountRepository, MAX_PAGE_SIZE};
