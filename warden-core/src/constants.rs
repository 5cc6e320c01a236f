//! Defaults and well-known names for Warden.

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// TTL applied by `set` when the caller does not pass one, in seconds.
pub const DEFAULT_TTL_SECS: f64 = 60.0;

/// Caches are unbounded unless a capacity is configured.
pub const DEFAULT_CACHE_MAX_ENTRIES: Option<usize> = None;

// ═══════════════════════════════════════════════════════════════════════════════
// RATE LIMITER DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Calls admitted per key within one window.
pub const DEFAULT_MAX_CALLS: usize = 5;

/// Length of the trailing window, in seconds.
pub const DEFAULT_PERIOD_SECS: f64 = 60.0;

/// Interval between background sweeps of expired cache entries and idle limiter keys.
pub const DEFAULT_JANITOR_INTERVAL_SECS: u64 = 300;

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLES
// ═══════════════════════════════════════════════════════════════════════════════

/// When truthy, limiters are replaced by one that admits every call.
pub const ENV_TESTING: &str = "WARDEN_TESTING";

/// Overrides [`DEFAULT_MAX_CALLS`].
pub const ENV_MAX_CALLS: &str = "WARDEN_MAX_CALLS";

/// Overrides [`DEFAULT_PERIOD_SECS`].
pub const ENV_PERIOD_SECS: &str = "WARDEN_PERIOD_SECS";

/// Overrides [`DEFAULT_TTL_SECS`].
pub const ENV_CACHE_TTL_SECS: &str = "WARDEN_CACHE_TTL_SECS";

/// Sets a cache capacity; unset leaves the cache unbounded.
pub const ENV_CACHE_MAX_ENTRIES: &str = "WARDEN_CACHE_MAX_ENTRIES";

/// When truthy, the rate limiter keys clients by the first `x-forwarded-for` hop.
pub const ENV_TRUST_PROXY: &str = "WARDEN_TRUST_PROXY";

/// Shared secret for admin endpoints; admin endpoints are disabled when unset.
pub const ENV_ADMIN_TOKEN: &str = "WARDEN_ADMIN_TOKEN";
