//! Request-level rate limiting and admin access.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";
const ADMIN_TOKEN: &str = "x-admin-token";
const ANONYMOUS: &str = "anonymous";

/// Rejects the request with 429 when its client is over the limit.
pub async fn enforce_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = client_key(request.headers(), peer, state.config.trust_forwarded_for);

    if !state.limiter.is_allowed(&client).await {
        warn!(client = %client, path = %request.uri().path(), "Request rejected by rate limiter");
        return Err(ApiError::too_many_requests(
            "Too many requests, try again later",
        ));
    }

    Ok(next.run(request).await)
}

/// Identifies the client a request is charged to.
///
/// The peer address is used unless `trust_forwarded_for` is set, in which
/// case the first `x-forwarded-for` hop wins when present. Requests with
/// neither share one bucket.
pub(crate) fn client_key(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trust_forwarded_for: bool,
) -> String {
    let forwarded = trust_forwarded_for
        .then(|| {
            headers
                .get(FORWARDED_FOR)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .flatten();

    match (forwarded, peer) {
        (Some(hop), _) => hop.to_owned(),
        (None, Some(ip)) => ip.to_string(),
        (None, None) => ANONYMOUS.to_owned(),
    }
}

/// Admits the request only with a matching `x-admin-token`.
///
/// Admin routes answer 403 when no token (or an empty one) is configured.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.admin_token.as_deref().filter(|t| !t.is_empty()) else {
        return Err(ApiError::forbidden("Admin endpoints are disabled"));
    };

    let presented = request
        .headers()
        .get(ADMIN_TOKEN)
        .map(|v| v.as_bytes())
        .unwrap_or_default();

    if !bool::from(presented.ct_eq(expected.as_bytes())) {
        warn!(path = %request.uri().path(), "Rejected admin request with bad token");
        return Err(ApiError::unauthorized("Missing or invalid admin token"));
    }

    Ok(next.run(request).await)
}
