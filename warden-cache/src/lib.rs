//! TTL cache for Warden.
//!
//! Generic in-memory cache with per-entry expiration, lazy eviction on read,
//! and an optional sweep for reclaiming memory.

mod cache;

pub use cache::{CacheStats, TtlCache};
