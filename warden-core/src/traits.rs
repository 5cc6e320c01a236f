//! Common traits for Warden.
//!
//! Call sites depend on [`RateLimit`] rather than a concrete limiter, so a
//! test environment can swap in one that admits everything.

use async_trait::async_trait;

// ═══════════════════════════════════════════════════════════════════════════════
// RATE LIMIT TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for per-key admission control.
///
/// Rejection is an ordinary answer, not an error. Implementations must make
/// each `is_allowed` call atomic with respect to other calls on the same key.
#[async_trait]
pub trait RateLimit: Send + Sync {
    /// Returns true if a call for `key` is admitted right now, recording it.
    async fn is_allowed(&self, key: &str) -> bool;

    /// Forgets the history of one key, or of every key when `key` is `None`.
    async fn reset(&self, key: Option<&str>);

    /// Drops keys whose history has fully aged out. Returns how many were dropped.
    ///
    /// Limiters that keep no per-key state have nothing to reclaim.
    async fn purge_idle(&self) -> usize {
        0
    }
}
