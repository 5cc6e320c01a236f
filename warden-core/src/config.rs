//! Validated configuration for limiters and caches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_MAX_CALLS, DEFAULT_PERIOD_SECS, DEFAULT_TTL_SECS,
};
use crate::error::{Result, WardenError};

/// Converts caller-facing seconds into a TTL.
///
/// Zero, negative, and NaN all map to `Duration::ZERO`, meaning the entry is
/// already expired on the next read. Values too large for a `Duration`
/// saturate to `Duration::MAX`.
pub fn ttl_from_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Sliding-window limiter configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Calls admitted per key within one window
    pub max_calls: usize,
    /// Window length in seconds
    pub period_secs: f64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            max_calls: DEFAULT_MAX_CALLS,
            period_secs: DEFAULT_PERIOD_SECS,
        }
    }
}

impl LimiterConfig {
    /// Checks that the window can ever admit a call.
    pub fn validate(&self) -> Result<()> {
        if self.max_calls == 0 {
            return Err(WardenError::ConfigError(
                "max_calls must be at least 1".into(),
            ));
        }
        if !self.period_secs.is_finite() || self.period_secs <= 0.0 {
            return Err(WardenError::ConfigError(format!(
                "period must be a positive number of seconds, got {}",
                self.period_secs
            )));
        }
        Ok(())
    }

    /// Window length as a `Duration`.
    pub fn period(&self) -> Duration {
        ttl_from_secs(self.period_secs)
    }
}

/// TTL cache configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL used by `set`, in seconds
    pub default_ttl_secs: f64,
    /// Optional capacity; when set, inserting a new key into a full cache
    /// evicts expired entries first, then the entry closest to expiring
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: DEFAULT_TTL_SECS,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    /// Checks the capacity and default TTL.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == Some(0) {
            return Err(WardenError::ConfigError(
                "max_entries must be at least 1".into(),
            ));
        }
        if !self.default_ttl_secs.is_finite() {
            return Err(WardenError::ConfigError(format!(
                "default TTL must be a finite number of seconds, got {}",
                self.default_ttl_secs
            )));
        }
        Ok(())
    }

    /// Default TTL as a `Duration`.
    pub fn default_ttl(&self) -> Duration {
        ttl_from_secs(self.default_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0 ; "zero")]
    #[test_case(-5.0 ; "negative")]
    #[test_case(f64::NAN ; "nan")]
    fn test_ttl_from_secs_expired(secs: f64) {
        assert_eq!(ttl_from_secs(secs), Duration::ZERO);
    }

    #[test]
    fn test_ttl_from_secs_positive() {
        assert_eq!(ttl_from_secs(1.5), Duration::from_millis(1500));
        assert_eq!(ttl_from_secs(f64::INFINITY), Duration::MAX);
    }

    #[test]
    fn test_limiter_config_defaults_are_valid() {
        let config = LimiterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.period(), Duration::from_secs(60));
    }

    #[test_case(0, 60.0 ; "zero calls")]
    #[test_case(3, 0.0 ; "zero period")]
    #[test_case(3, -1.0 ; "negative period")]
    #[test_case(3, f64::INFINITY ; "infinite period")]
    fn test_limiter_config_rejects(max_calls: usize, period_secs: f64) {
        let config = LimiterConfig { max_calls, period_secs };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, WardenError::ConfigError(_)));
    }

    #[test]
    fn test_cache_config_validation() {
        assert!(CacheConfig::default().validate().is_ok());
        assert!(CacheConfig { default_ttl_secs: -3.0, max_entries: Some(1) }.validate().is_ok());
        assert!(CacheConfig { default_ttl_secs: 60.0, max_entries: Some(0) }.validate().is_err());
    }

    #[test_case(f64::NAN ; "nan")]
    #[test_case(f64::INFINITY ; "infinite")]
    #[test_case(f64::NEG_INFINITY ; "negative infinite")]
    fn test_cache_config_rejects_non_finite_ttl(default_ttl_secs: f64) {
        let config = CacheConfig { default_ttl_secs, max_entries: None };
        assert!(matches!(config.validate(), Err(WardenError::ConfigError(_))));
    }

    #[test]
    fn test_cache_config_is_unbounded_by_default() {
        assert_eq!(CacheConfig::default().max_entries, None);
    }

    #[test]
    fn test_config_json_roundtrip() {
        let json = r#"{"max_calls": 10, "period_secs": 0.5}"#;
        let config: LimiterConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_calls, 10);
        assert_eq!(config.period(), Duration::from_millis(500));
    }
}
