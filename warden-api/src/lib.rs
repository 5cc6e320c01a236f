//! # Warden API Server
//!
//! HTTP service that owns one shared TTL cache and one rate limiter and
//! hands them to handlers through axum state.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness (not rate limited)
//! - `GET /api/v1/cache/:key` - Read a cached value
//! - `PUT /api/v1/cache/:key` - Cache a value with an optional TTL
//! - `DELETE /api/v1/cache/:key` - Remove a cached value
//! - `DELETE /api/v1/cache` - Clear the cache
//! - `GET /api/v1/cache/stats` - Cache statistics
//! - `POST /api/v1/admin/limits/reset` - Reset one client's rate limit, or all
//!   (requires `x-admin-token`)
//!
//! Clients are keyed by peer address; `x-forwarded-for` is honored only when
//! [`ApiConfig::trust_forwarded_for`] is set.
//!
//! ## Example
//!
//! ```rust,ignore
//! use warden_api::{ApiServer, ApiConfig};
//!
//! let server = ApiServer::new(ApiConfig::from_env()?)?;
//! server.run(([0, 0, 0, 0], 3001)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod middleware;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use warden_core::Result;

/// API server for Warden.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self {
            state: Arc::new(AppState::new(config)?),
        })
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("Warden API server listening on {}", addr);

        let janitor = spawn_janitor(self.state.clone());
        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();
        let served = axum::serve(listener, app).await;
        janitor.abort();
        served
    }
}

/// Periodically reclaims expired cache entries and idle limiter keys.
fn spawn_janitor(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(state.config.janitor_interval);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let expired = state.cache.purge_expired().await;
            let idle = state.limiter.purge_idle().await;
            debug!(expired, idle, "Janitor pass complete");
        }
    })
}
