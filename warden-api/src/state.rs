//! App state: config, shared cache, limiter.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::info;

use warden_cache::TtlCache;
use warden_core::{
    CacheConfig, LimiterConfig, RateLimit, Result, WardenError, DEFAULT_JANITOR_INTERVAL_SECS,
    ENV_ADMIN_TOKEN, ENV_CACHE_MAX_ENTRIES, ENV_CACHE_TTL_SECS, ENV_MAX_CALLS, ENV_PERIOD_SECS,
    ENV_TESTING, ENV_TRUST_PROXY,
};
use warden_limiter::build_limiter;

/// Service configuration.
#[derive(Clone)]
pub struct ApiConfig {
    /// Per-client request budget
    pub limiter: LimiterConfig,
    /// Shared cache settings
    pub cache: CacheConfig,
    /// Admit every request regardless of rate (test and CI environments)
    pub testing: bool,
    /// Key clients by the first `x-forwarded-for` hop instead of the peer
    /// address. Only safe behind a proxy that overwrites the header.
    pub trust_forwarded_for: bool,
    /// Token required in `x-admin-token` by admin routes; `None` disables them
    pub admin_token: Option<String>,
    /// How often expired entries and idle limiter keys are swept
    pub janitor_interval: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            limiter: LimiterConfig::default(),
            cache: CacheConfig::default(),
            testing: false,
            trust_forwarded_for: false,
            admin_token: None,
            janitor_interval: Duration::from_secs(DEFAULT_JANITOR_INTERVAL_SECS),
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("limiter", &self.limiter)
            .field("cache", &self.cache)
            .field("testing", &self.testing)
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .field("janitor_interval", &self.janitor_interval)
            .finish()
    }
}

impl ApiConfig {
    /// Reads `WARDEN_*` variables, after loading a `.env` file if present.
    ///
    /// Unset variables keep their defaults; set but unparsable ones are errors.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let config = Self {
            limiter: LimiterConfig {
                max_calls: env_parse(ENV_MAX_CALLS)?.unwrap_or(defaults.limiter.max_calls),
                period_secs: env_parse(ENV_PERIOD_SECS)?.unwrap_or(defaults.limiter.period_secs),
            },
            cache: CacheConfig {
                default_ttl_secs: env_parse(ENV_CACHE_TTL_SECS)?
                    .unwrap_or(defaults.cache.default_ttl_secs),
                max_entries: env_parse(ENV_CACHE_MAX_ENTRIES)?.or(defaults.cache.max_entries),
            },
            testing: env_flag(ENV_TESTING),
            trust_forwarded_for: env_flag(ENV_TRUST_PROXY),
            admin_token: std::env::var(ENV_ADMIN_TOKEN)
                .ok()
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty()),
            janitor_interval: defaults.janitor_interval,
        };
        config.limiter.validate()?;
        config.cache.validate()?;
        Ok(config)
    }
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| WardenError::ConfigError(format!("{name} has invalid value '{raw}'"))),
        Err(_) => Ok(None),
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).map(|v| is_truthy(&v)).unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Components shared by every request.
///
/// Built once at startup and handed to handlers through axum state, so
/// there is exactly one cache and one limiter per process.
pub struct AppState {
    /// Configuration the state was built from
    pub config: ApiConfig,
    /// Cache of arbitrary JSON values
    pub cache: Arc<TtlCache<Value>>,
    /// Per-client limiter; always-allow in testing mode
    pub limiter: Arc<dyn RateLimit>,
}

impl AppState {
    /// Builds the shared cache and limiter, rejecting invalid configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let cache = Arc::new(TtlCache::with_config(config.cache.clone())?);
        let limiter = build_limiter(&config.limiter, config.testing)?;

        info!(
            max_calls = config.limiter.max_calls,
            period_secs = config.limiter.period_secs,
            default_ttl_secs = config.cache.default_ttl_secs,
            testing = config.testing,
            trust_forwarded_for = config.trust_forwarded_for,
            admin_enabled = config.admin_token.is_some(),
            "Initialized shared cache and rate limiter"
        );

        Ok(Self {
            config,
            cache,
            limiter,
        })
    }
}
