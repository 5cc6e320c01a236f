//! In-memory TTL cache keyed by string.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument, trace};

use warden_core::{CacheConfig, Clock, MonotonicClock, Result};

/// Cache entry with an absolute expiry.
///
/// `expires_at == None` never expires.
struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// In-memory TTL cache.
///
/// Unbounded unless [`CacheConfig::max_entries`] is set. Every operation
/// holds one async lock for its whole duration, so a reader
/// never sees a value paired with another write's expiry. Expired entries stay
/// in the map until a `get` touches them, a bounded `set` needs room, or
/// [`purge_expired`](Self::purge_expired) sweeps them.
pub struct TtlCache<V, C = MonotonicClock> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    config: CacheConfig,
    clock: C,
}

impl<V: Clone + Send> TtlCache<V> {
    /// Creates a new cache with default configuration.
    pub fn new() -> Self {
        Self::build(CacheConfig::default(), MonotonicClock)
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, MonotonicClock)
    }
}

impl<V: Clone + Send> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send, C: Clock> TtlCache<V, C> {
    /// Creates a cache that reads time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: CacheConfig, clock: C) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
            clock,
        }
    }

    /// TTL applied by [`set`](Self::set).
    pub fn default_ttl(&self) -> Duration {
        self.config.default_ttl()
    }

    /// Gets a cached value.
    ///
    /// Returns `None` if the key was never set or has expired; an expired
    /// entry is removed as a side effect.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let now = self.clock.now();

        let expired = entries.get(key)?.is_expired(now);
        if expired {
            entries.remove(key);
            trace!(key, "Evicted expired cache entry");
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    /// Caches a value with the default TTL.
    pub async fn set(&self, key: &str, value: V) {
        self.set_with_ttl(key, value, self.default_ttl()).await;
    }

    /// Caches a value with a custom TTL, replacing any previous entry.
    ///
    /// A zero TTL stores an entry that is already expired.
    pub async fn set_with_ttl(&self, key: &str, value: V, ttl: Duration) {
        let mut entries = self.entries.lock().await;
        let now = self.clock.now();
        // A TTL past the end of representable time never expires.
        let expires_at = now.checked_add(ttl);
        self.make_room(&mut entries, key, now);
        entries.insert(key.to_owned(), CacheEntry { value, expires_at });
    }

    /// Caches a value that never expires.
    pub async fn set_persistent(&self, key: &str, value: V) {
        let mut entries = self.entries.lock().await;
        let now = self.clock.now();
        self.make_room(&mut entries, key, now);
        entries.insert(
            key.to_owned(),
            CacheEntry {
                value,
                expires_at: None,
            },
        );
    }

    fn make_room(&self, entries: &mut HashMap<String, CacheEntry<V>>, key: &str, now: Instant) {
        let Some(max_entries) = self.config.max_entries else {
            return;
        };
        if entries.len() < max_entries || entries.contains_key(key) {
            return;
        }

        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        if entries.len() < before {
            debug!(purged = before - entries.len(), "Purged expired entries at capacity");
        }

        // Still at capacity? Remove the entry closest to expiring
        if entries.len() >= max_entries {
            if let Some(victim) = entries
                .iter()
                .min_by_key(|(_, e)| (e.expires_at.is_none(), e.expires_at))
                .map(|(k, _)| k.clone())
            {
                entries.remove(&victim);
                debug!(key = %victim, "Evicted cache entry at capacity");
            }
        }
    }

    /// Removes a cached entry, returning its value if it was still live.
    pub async fn remove(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let now = self.clock.now();
        entries
            .remove(key)
            .filter(|e| !e.is_expired(now))
            .map(|e| e.value)
    }

    /// Clears all cached entries, expired or not.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Removes all expired entries. Returns how many were dropped.
    #[instrument(skip(self))]
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = self.clock.now();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, remaining = entries.len(), "Purged expired cache entries");
        }
        purged
    }

    /// Returns the number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Returns cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().await;
        let now = self.clock.now();
        let expired = entries.values().filter(|e| e.is_expired(now)).count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
            capacity: self.config.max_entries,
        }
    }
}

/// Cache statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub valid_entries: usize,
    /// `None` when the cache is unbounded
    pub capacity: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use warden_core::ManualClock;

    fn manual_cache<V: Clone + Send>() -> (TtlCache<V, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let cache = TtlCache::with_clock(CacheConfig::default(), clock.clone()).unwrap();
        (cache, clock)
    }

    #[tokio::test]
    async fn test_cache_set_get() {
        let cache = TtlCache::new();
        cache.set("user:1", "alice".to_string()).await;
        assert_eq!(cache.get("user:1").await.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache: TtlCache<String> = TtlCache::new();
        assert!(cache.get("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn test_cache_ttl_expiration() {
        let (cache, clock) = manual_cache();
        cache.set_with_ttl("k", 7u32, Duration::from_secs(10)).await;

        clock.advance(Duration::from_secs(9));
        assert_eq!(cache.get("k").await, Some(7));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_cache_default_ttl_is_sixty_seconds() {
        let (cache, clock) = manual_cache();
        assert_eq!(cache.default_ttl(), Duration::from_secs(60));
        cache.set("k", 1u8).await;

        clock.advance(Duration::from_secs(59));
        assert!(cache.get("k").await.is_some());
        clock.advance(Duration::from_secs(1));
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_cache_zero_ttl_is_expired_immediately() {
        let (cache, _clock) = manual_cache();
        cache.set_with_ttl("k", 1u8, Duration::ZERO).await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_cache_expired_entry_is_evicted_on_read() {
        let (cache, clock) = manual_cache();
        cache.set_with_ttl("k", 1u8, Duration::from_secs(1)).await;
        clock.advance(Duration::from_secs(2));

        assert_eq!(cache.len().await, 1);
        assert!(cache.get("k").await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_cache_distinguishes_null_from_absent() {
        let cache: TtlCache<Option<String>> = TtlCache::new();
        cache.set("empty", None).await;
        assert_eq!(cache.get("empty").await, Some(None));
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn test_cache_overwrite_replaces_value_and_ttl() {
        let (cache, clock) = manual_cache();
        cache.set_with_ttl("k", "first", Duration::from_secs(100)).await;
        cache.set_with_ttl("k", "second", Duration::from_secs(5)).await;

        assert_eq!(cache.get("k").await, Some("second"));
        clock.advance(Duration::from_secs(5));
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn test_cache_overwrite_can_extend_ttl() {
        let (cache, clock) = manual_cache();
        cache.set_with_ttl("k", 1u8, Duration::ZERO).await;
        cache.set_with_ttl("k", 2u8, Duration::from_secs(5)).await;
        clock.advance(Duration::from_secs(4));
        assert_eq!(cache.get("k").await, Some(2));
    }

    #[tokio::test]
    async fn test_cache_persistent_entry_never_expires() {
        let (cache, clock) = manual_cache();
        cache.set_persistent("k", 1u8).await;
        clock.advance(Duration::from_secs(86_400 * 365));
        assert_eq!(cache.get("k").await, Some(1));
    }

    #[tokio::test]
    async fn test_cache_remove() {
        let cache = TtlCache::new();
        cache.set("k", 1u8).await;
        assert_eq!(cache.remove("k").await, Some(1));
        assert!(cache.get("k").await.is_none());
        assert_eq!(cache.remove("k").await, None);
    }

    #[tokio::test]
    async fn test_cache_clear() {
        let (cache, clock) = manual_cache();
        cache.set_with_ttl("stale", 1u8, Duration::from_secs(1)).await;
        cache.set("fresh", 2u8).await;
        clock.advance(Duration::from_secs(2));

        cache.clear().await;

        assert!(cache.is_empty().await);
        assert!(cache.get("stale").await.is_none());
        assert!(cache.get("fresh").await.is_none());
    }

    #[tokio::test]
    async fn test_cache_clear_empty_is_noop() {
        let cache: TtlCache<u8> = TtlCache::new();
        cache.clear().await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_purge_expired() {
        let (cache, clock) = manual_cache();
        cache.set_with_ttl("a", 1u8, Duration::from_secs(1)).await;
        cache.set_with_ttl("b", 2u8, Duration::from_secs(1)).await;
        cache.set("c", 3u8).await;
        clock.advance(Duration::from_secs(2));

        assert_eq!(cache.purge_expired().await, 2);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("c").await, Some(3));
    }

    #[tokio::test]
    async fn test_cache_capacity_prefers_expired_then_soonest() {
        let clock = ManualClock::new();
        let config = CacheConfig {
            default_ttl_secs: 60.0,
            max_entries: Some(2),
        };
        let cache = TtlCache::with_clock(config, clock.clone()).unwrap();

        cache.set_with_ttl("short", 1u8, Duration::from_secs(10)).await;
        cache.set_with_ttl("long", 2u8, Duration::from_secs(100)).await;
        cache.set("third", 3u8).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("short").await.is_none());
        assert_eq!(cache.get("long").await, Some(2));
        assert_eq!(cache.get("third").await, Some(3));
    }

    #[tokio::test]
    async fn test_cache_overwrite_at_capacity_does_not_evict() {
        let config = CacheConfig {
            default_ttl_secs: 60.0,
            max_entries: Some(2),
        };
        let cache = TtlCache::with_config(config).unwrap();
        cache.set("a", 1u8).await;
        cache.set("b", 2u8).await;
        cache.set("a", 3u8).await;

        assert_eq!(cache.get("a").await, Some(3));
        assert_eq!(cache.get("b").await, Some(2));
    }

    #[tokio::test]
    async fn test_cache_default_is_unbounded() {
        let (cache, _clock) = manual_cache();
        for i in 0..20_000u32 {
            cache.set(&format!("k{i}"), i).await;
        }

        assert_eq!(cache.len().await, 20_000);
        assert_eq!(cache.get("k0").await, Some(0));
        assert_eq!(cache.get("k19999").await, Some(19_999));
        assert_eq!(cache.stats().await.capacity, None);
    }

    #[tokio::test]
    async fn test_cache_rejects_invalid_config() {
        let config = CacheConfig {
            default_ttl_secs: 60.0,
            max_entries: Some(0),
        };
        assert!(TtlCache::<u8>::with_config(config).is_err());
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let (cache, clock) = manual_cache();
        cache.set_with_ttl("a", 1u8, Duration::from_secs(1)).await;
        cache.set("b", 2u8).await;
        clock.advance(Duration::from_secs(2));

        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(stats.valid_entries, 1);
        assert_eq!(stats.capacity, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cache_concurrent_writers_never_tear() {
        let cache = Arc::new(TtlCache::<(u32, u32)>::new());
        let writers = (0..32u32).map(|i| {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache.set("shared", (i, i * 2)).await;
            })
        });
        futures::future::join_all(writers).await;

        let (a, b) = cache.get("shared").await.unwrap();
        assert_eq!(b, a * 2);
    }
}
