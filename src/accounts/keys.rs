//! Cache key conventions for user accounts.
//!
//! | Key | Holds |
//! |---|---|
//! | `user_account:{uuid}` | one account |
//! | `user_accounts:all` | every live account |
//! | `user_accounts:list:{page}:{limit}:{orderBy}:{direction}` | one listing page |
//!
//! The single-account prefix is `user_account:` (singular), so
//! [`USER_ACCOUNTS_PATTERN`] purges listings without touching single entries.

use super::model::ListQuery;
use crate::cache::KeyPattern;
use crate::service::Invalidation;

pub const USER_ACCOUNTS_ALL: &str = "user_accounts:all";

/// Covers `user_accounts:all` and every listing page.
pub const USER_ACCOUNTS_PATTERN: &str = "user_accounts:*";

pub fn user_account(uuid: &str) -> String {
    format!("user_account:{}", uuid)
}

pub fn user_accounts_list(query: &ListQuery) -> String {
    format!(
        "user_accounts:list:{}:{}:{}:{}",
        query.page, query.limit, query.order_by, query.direction
    )
}

/// Keys to purge after any write to account `uuid`: its own entry and
/// every listing that may contain it.
pub fn account_invalidation(uuid: &str) -> Invalidation {
    Invalidation::new()
        .key(user_account(uuid))
        .key_pattern(KeyPattern::prefix("user_accounts:"))
}
