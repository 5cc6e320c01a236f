//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info};

use warden_cache::CacheStats;
use warden_core::{ttl_from_secs, WardenError};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        rate_limiting: !state.config.testing,
    })
}

/// GET /api/v1/cache/:key
pub async fn get_cached(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<CachedValueResponse>> {
    let value = state
        .cache
        .get(&key)
        .await
        .ok_or_else(|| ApiError::not_found(format!("No cached value for '{key}'")))?;

    Ok(Json(CachedValueResponse { key, value }))
}

/// PUT /api/v1/cache/:key
pub async fn put_cached(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(req): Json<PutCacheRequest>,
) -> Result<StatusCode> {
    if key.trim().is_empty() {
        return Err(WardenError::ValidationError("cache key cannot be blank".into()).into());
    }

    match req.ttl_secs {
        Some(secs) => {
            state
                .cache
                .set_with_ttl(&key, req.value, ttl_from_secs(secs))
                .await
        }
        None => state.cache.set(&key, req.value).await,
    }

    debug!(key = %key, ttl_secs = ?req.ttl_secs, "Cached value");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/cache/:key
pub async fn delete_cached(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<StatusCode> {
    state
        .cache
        .remove(&key)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiError::not_found(format!("No cached value for '{key}'")))
}

/// DELETE /api/v1/cache
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    state.cache.clear().await;
    info!("Cache cleared");
    StatusCode::NO_CONTENT
}

/// GET /api/v1/cache/stats
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.cache.stats().await)
}

/// POST /api/v1/admin/limits/reset
///
/// Without a JSON body every key is reset.
pub async fn reset_limits(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ResetLimitsRequest>>,
) -> StatusCode {
    let key = body.and_then(|Json(req)| req.key);
    state.limiter.reset(key.as_deref()).await;
    info!(key = ?key, "Rate limits reset");
    StatusCode::NO_CONTENT
}
