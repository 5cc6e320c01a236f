//! DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response for the health check.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the service answers
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
    /// False when the service runs with the limiter bypassed
    pub rate_limiting: bool,
}

/// Request to cache a value.
#[derive(Debug, Deserialize)]
pub struct PutCacheRequest {
    /// Arbitrary JSON, `null` included
    pub value: Value,
    /// Seconds until expiry; zero or negative expires at once. Defaults to the cache TTL.
    pub ttl_secs: Option<f64>,
}

/// A cached value.
#[derive(Debug, Serialize, Deserialize)]
pub struct CachedValueResponse {
    /// Key as requested
    pub key: String,
    /// Stored value, possibly `null`
    pub value: Value,
}

/// Request to reset rate limits.
#[derive(Debug, Default, Deserialize)]
pub struct ResetLimitsRequest {
    /// Key to reset; every key when absent
    pub key: Option<String>,
}
