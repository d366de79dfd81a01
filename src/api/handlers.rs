//! API Handlers
//!
//! HTTP request handlers for the admin endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::backend::{CacheBackend, LocalBackend, RedisBackend, TieredBackend};
use crate::config::{BackendKind, Config};
use crate::error::{CacheError, Result};
use crate::models::{HealthResponse, InvalidatePatternRequest, InvalidateResponse, StatsResponse};
use crate::service::CacheService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheService,
    /// In-process tier, when the configured backend has one; swept by the
    /// background cleanup task.
    pub local: Option<LocalBackend>,
}

impl AppState {
    /// Creates a new AppState over a local-only backend.
    pub fn new(local: LocalBackend) -> Self {
        Self {
            cache: CacheService::new(Arc::new(local.clone())),
            local: Some(local),
        }
    }

    pub fn with_service(cache: CacheService, local: Option<LocalBackend>) -> Self {
        Self { cache, local }
    }

    /// Builds the configured backend and the service over it.
    ///
    /// Fails when a redis-backed configuration cannot reach redis at startup.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let (backend, local): (Arc<dyn CacheBackend>, Option<LocalBackend>) = match config.backend {
            BackendKind::Local => {
                let local = LocalBackend::with_capacity_bound(config.max_entries);
                (Arc::new(local.clone()), Some(local))
            }
            BackendKind::Tiered => {
                let shared = RedisBackend::connect(&config.redis_url).await?;
                let local = LocalBackend::with_capacity_bound(config.max_entries);
                let tiered = TieredBackend::new(local.clone(), Arc::new(shared), config.l1_ttl());
                (Arc::new(tiered), Some(local))
            }
            BackendKind::Redis => {
                let shared = RedisBackend::connect(&config.redis_url).await?;
                (Arc::new(shared), None)
            }
        };

        info!(
            backend = backend.name(),
            policy = %config.failure_policy,
            single_flight = config.single_flight,
            "Cache service initialized"
        );

        let cache = CacheService::new(backend)
            .with_failure_policy(config.failure_policy)
            .with_single_flight(config.single_flight);

        Ok(Self::with_service(cache, local))
    }
}

/// Handler for DELETE /cache/keys/:key
///
/// Removing an absent key succeeds.
pub async fn delete_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }

    state.cache.invalidate(&key).await?;
    info!(key = %key, "Key invalidated via admin API");

    Ok(Json(InvalidateResponse::key(key)))
}

/// Handler for POST /cache/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidatePatternRequest>,
) -> Result<Json<InvalidateResponse>> {
    let pattern = req.validate()?;

    let removed = state.cache.invalidate_key_pattern(&pattern).await?;
    info!(pattern = %pattern, removed, "Pattern invalidated via admin API");

    Ok(Json(InvalidateResponse::pattern(req.pattern, removed)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let backend = state.cache.backend();
    let local = backend.local_stats().await;

    Json(StatsResponse::new(backend.name(), state.cache.stats(), local))
}

/// Handler for GET /health
///
/// Responds 503 with status "degraded" when the backing store does not
/// answer a ping.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let name = state.cache.backend().name();

    match state.cache.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::healthy(name))),
        Err(e) => {
            warn!(backend = name, error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::degraded(name, e.to_string())),
            )
        }
    }
}
