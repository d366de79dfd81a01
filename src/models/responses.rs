//! Response DTOs for the admin API

use serde::Serialize;

use crate::cache::CacheStats;
use crate::service::ServiceStats;

/// Response body for the invalidation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Key or pattern that was invalidated
    pub target: String,
    /// Entries removed; single-key deletes report 0 or 1 only when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<u64>,
    pub message: String,
}

impl InvalidateResponse {
    pub fn key(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' invalidated", key),
            target: key,
            removed: None,
        }
    }

    pub fn pattern(pattern: impl Into<String>, removed: u64) -> Self {
        let pattern = pattern.into();
        Self {
            message: format!("Pattern '{}' invalidated {} entries", pattern, removed),
            target: pattern,
            removed: Some(removed),
        }
    }
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub backend: String,
    pub service: ServiceStats,
    /// hits / (hits + misses) as seen by the service
    pub hit_rate: f64,
    /// In-process tier counters, absent for the redis-only backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<CacheStats>,
}

impl StatsResponse {
    pub fn new(
        backend: impl Into<String>,
        service: ServiceStats,
        local: Option<CacheStats>,
    ) -> Self {
        let total = service.hits + service.misses;
        let hit_rate = if total > 0 {
            service.hits as f64 / total as f64
        } else {
            0.0
        };
        Self {
            backend: backend.into(),
            service,
            hit_rate,
            local,
        }
    }
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy", or "degraded" when the backing store does not answer
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy(backend: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            backend: backend.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn degraded(backend: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: "degraded".to_string(),
            backend: backend.into(),
            error: Some(error.into()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}
