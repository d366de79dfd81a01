//! Cached account repository.
//!
//! Reads go through the cache; writes hit the store first and then purge the
//! account's own key plus every listing key.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use super::keys;
use super::model::{ListQuery, Page, UpdateAccount, UserAccount};
use crate::config::CacheTtls;
use crate::error::CacheError;
use crate::service::CacheService;

/// Largest page size accepted by [`CachedAccountRepository::find_page`].
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Persistence collaborator, e.g. a SQL-backed implementation.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<UserAccount>, AccountError>;

    /// Every account not soft-deleted.
    async fn find_all(&self) -> Result<Vec<UserAccount>, AccountError>;

    async fn find_page(&self, query: &ListQuery) -> Result<Page<UserAccount>, AccountError>;

    async fn update(
        &self,
        uuid: &str,
        changes: &UpdateAccount,
    ) -> Result<UserAccount, AccountError>;

    async fn soft_delete(&self, uuid: &str, deleted_by: &str) -> Result<UserAccount, AccountError>;
}

pub struct CachedAccountRepository<S> {
    store: S,
    cache: CacheService,
    ttls: CacheTtls,
}

impl<S: AccountStore> CachedAccountRepository<S> {
    pub fn new(store: S, cache: CacheService, ttls: CacheTtls) -> Self {
        Self { store, cache, ttls }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Looks up one account. A missing account is an error and is not cached.
    pub async fn find_one(&self, uuid: &str) -> Result<UserAccount, AccountError> {
        if uuid.is_empty() {
            return Err(AccountError::InvalidInput("User UUID is required".to_string()));
        }

        let store = &self.store;
        self.cache
            .get_or_load(&keys::user_account(uuid), self.ttls.user_account(), || async move {
                store
                    .find_by_uuid(uuid)
                    .await?
                    .ok_or_else(|| AccountError::NotFound(uuid.to_string()))
            })
            .await
    }

    pub async fn find_all(&self) -> Result<Vec<UserAccount>, AccountError> {
        let store = &self.store;
        self.cache
            .get_or_load(keys::USER_ACCOUNTS_ALL, self.ttls.all_user_accounts(), || async move {
                store.find_all().await
            })
            .await
    }

    pub async fn find_page(&self, query: &ListQuery) -> Result<Page<UserAccount>, AccountError> {
        if query.page == 0 {
            return Err(AccountError::InvalidInput("page starts at 1".to_string()));
        }
        if query.limit == 0 || query.limit > MAX_PAGE_SIZE {
            return Err(AccountError::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let store = &self.store;
        self.cache
            .get_or_load(
                &keys::user_accounts_list(query),
                self.ttls.user_accounts_list(),
                || async move { store.find_page(query).await },
            )
            .await
    }

    pub async fn update(
        &self,
        uuid: &str,
        changes: &UpdateAccount,
    ) -> Result<UserAccount, AccountError> {
        if changes.is_empty() {
            return Err(AccountError::InvalidInput("No data for update".to_string()));
        }

        let updated = self.store.update(uuid, changes).await?;
        self.invalidate_account(uuid).await?;
        Ok(updated)
    }

    pub async fn soft_delete(
        &self,
        uuid: &str,
        deleted_by: &str,
    ) -> Result<UserAccount, AccountError> {
        let deleted = self.store.soft_delete(uuid, deleted_by).await?;
        self.invalidate_account(uuid).await?;
        Ok(deleted)
    }

    async fn invalidate_account(&self, uuid: &str) -> Result<(), AccountError> {
        if let Err(e) = self.cache.apply(&keys::account_invalidation(uuid)).await {
            // the write itself went through; the caller decides about staleness
            warn!(uuid = %uuid, error = %e, "Account written but cache invalidation failed");
            return Err(AccountError::Cache(e));
        }
        debug!(uuid = %uuid, "Account cache entries invalidated");
        Ok(())
    }
}
