//! API route configuration.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::handlers;
use crate::middleware::{enforce_rate_limit, require_admin};
use crate::state::AppState;

/// Creates the API router with all routes configured.
///
/// Cache routes pass through the rate limiter. Admin routes require the
/// configured admin token instead, so a limited client cannot lift its own
/// limit. `/health` is open.
pub fn create_router(state: Arc<AppState>) -> Router {
    let limited = Router::new()
        // Cache
        .route("/api/v1/cache", delete(handlers::clear_cache))
        .route("/api/v1/cache/stats", get(handlers::cache_stats))
        .route(
            "/api/v1/cache/:key",
            get(handlers::get_cached)
                .put(handlers::put_cached)
                .delete(handlers::delete_cached),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_rate_limit,
        ));

    let admin = Router::new()
        // Rate limits
        .route("/api/v1/admin/limits/reset", post(handlers::reset_limits))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .merge(limited)
        .merge(admin)
        .with_state(state)
}
