//! Account records and query types exchanged with the persistence layer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoginType {
    Email,
    Google,
    Github,
}

/// A user account as cached. Field names follow the persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub uuid: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub login_type: LoginType,
    #[serde(default)]
    pub role_uuid: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_by: Option<String>,
    pub version: i32,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAccount {
    pub email: Option<String>,
    pub description: Option<String>,
}

impl UpdateAccount {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "asc"),
            OrderDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Paginated, sorted listing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub order_by: String,
    pub direction: OrderDirection,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 100,
            order_by: "updatedAt".to_string(),
            direction: OrderDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}

impl PageMeta {
    pub fn new(total: u64, page: u32, limit: u32) -> Self {
        let pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            total,
            page,
            limit,
            pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_meta_rounds_up() {
        assert_eq!(PageMeta::new(21, 1, 10).pages, 3);
        assert_eq!(PageMeta::new(20, 1, 10).pages, 2);
        assert_eq!(PageMeta::new(0, 1, 10).pages, 0);
    }

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 100);
        assert_eq!(query.order_by, "updatedAt");
        assert_eq!(query.direction, OrderDirection::Desc);
    }

    #[test]
    fn test_account_json_shape() {
        let json = r#"{
            "id": 1,
            "uuid": "42",
            "email": "a@x.com",
            "login_type": "EMAIL",
            "created_at": "2024-01-01T00:00:00Z",
            "version": 1
        }"#;

        let account: UserAccount = serde_json::from_str(json).unwrap();
        assert_eq!(account.uuid, "42");
        assert_eq!(account.login_type, LoginType::Email);
        assert!(account.deleted_at.is_none());
    }
}
