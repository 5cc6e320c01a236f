//! Sliding-window limiter over per-key call histories.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use warden_core::{Clock, LimiterConfig, MonotonicClock, RateLimit, Result, WardenError};

/// Per-key sliding-window rate limiter.
///
/// Each key keeps the instants of its admitted calls, oldest first. A check
/// drops the instants that have left the window, then admits the call only if
/// fewer than `max_calls` remain. Rejected calls are not recorded.
///
/// # Locking
///
/// One async mutex guards the whole history map, so the prune, decide and
/// append steps of a check happen as one unit and calls on unrelated keys
/// are serialized too.
#[derive(Debug)]
pub struct SlidingWindowLimiter<C = MonotonicClock> {
    /// key → admitted call instants, oldest first
    history: Mutex<HashMap<String, VecDeque<Instant>>>,
    max_calls: usize,
    period: Duration,
    clock: C,
}

impl SlidingWindowLimiter {
    /// Creates a limiter admitting `max_calls` per key within each `period`.
    pub fn new(max_calls: usize, period: Duration) -> Result<Self> {
        Self::with_clock(max_calls, period, MonotonicClock)
    }

    /// Creates a limiter from configuration.
    pub fn from_config(config: &LimiterConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.max_calls, config.period())
    }
}

impl<C: Clock> SlidingWindowLimiter<C> {
    /// Creates a limiter that reads time from `clock`.
    pub fn with_clock(max_calls: usize, period: Duration, clock: C) -> Result<Self> {
        if max_calls == 0 {
            return Err(WardenError::ConfigError(
                "max_calls must be at least 1".into(),
            ));
        }
        if period.is_zero() {
            return Err(WardenError::ConfigError("period must be non-zero".into()));
        }
        Ok(Self {
            history: Mutex::new(HashMap::new()),
            max_calls,
            period,
            clock,
        })
    }

    /// Calls admitted per key within one window.
    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    /// Window length.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Checks whether a call for `key` is admitted, recording it if so.
    #[instrument(skip(self), level = "trace")]
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut history = self.history.lock().await;
        let now = self.clock.now();

        // Known keys are looked up by reference; only a first call allocates.
        let Some(calls) = history.get_mut(key) else {
            history.insert(key.to_owned(), VecDeque::from([now]));
            return true;
        };
        prune(calls, now, self.period);

        if calls.len() < self.max_calls {
            calls.push_back(now);
            true
        } else {
            debug!(key, in_window = calls.len(), max_calls = self.max_calls, "Rate limit exceeded");
            false
        }
    }

    /// Forgets one key's history, or every key's when `key` is `None`.
    ///
    /// Unknown keys are ignored.
    pub async fn reset(&self, key: Option<&str>) {
        let mut history = self.history.lock().await;
        match key {
            Some(key) => {
                history.remove(key);
                debug!(key, "Rate limit reset");
            }
            None => {
                let keys = history.len();
                history.clear();
                debug!(keys, "Rate limits reset for all keys");
            }
        }
    }

    /// Calls `key` could still make in the current window, without recording one.
    pub async fn remaining(&self, key: &str) -> usize {
        let mut history = self.history.lock().await;
        let now = self.clock.now();
        match history.get_mut(key) {
            Some(calls) => {
                prune(calls, now, self.period);
                self.max_calls.saturating_sub(calls.len())
            }
            None => self.max_calls,
        }
    }

    /// Drops keys with no calls left in the window. Returns how many were dropped.
    ///
    /// Stale instants are otherwise only freed when their key is checked
    /// again, so keys that go quiet would stay in memory indefinitely.
    #[instrument(skip(self))]
    pub async fn purge_idle(&self) -> usize {
        let mut history = self.history.lock().await;
        let now = self.clock.now();
        let before = history.len();
        history.retain(|_, calls| {
            prune(calls, now, self.period);
            !calls.is_empty()
        });
        let purged = before - history.len();
        if purged > 0 {
            debug!(purged, remaining = history.len(), "Purged idle rate limit keys");
        }
        purged
    }

    /// Number of keys with a stored history.
    pub async fn tracked_keys(&self) -> usize {
        self.history.lock().await.len()
    }
}

/// Drops instants at or before `now - period` from the front.
fn prune(calls: &mut VecDeque<Instant>, now: Instant, period: Duration) {
    while calls
        .front()
        .is_some_and(|&t| now.saturating_duration_since(t) >= period)
    {
        calls.pop_front();
    }
}

#[async_trait]
impl<C: Clock> RateLimit for SlidingWindowLimiter<C> {
    async fn is_allowed(&self, key: &str) -> bool {
        SlidingWindowLimiter::is_allowed(self, key).await
    }

    async fn reset(&self, key: Option<&str>) {
        SlidingWindowLimiter::reset(self, key).await
    }

    async fn purge_idle(&self) -> usize {
        SlidingWindowLimiter::purge_idle(self).await
    }
}
