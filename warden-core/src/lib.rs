//! # Warden Core
//!
//! Shared building blocks for the Warden rate limiter and TTL cache.
//!
//! - **Errors**: `WardenError` and the crate-wide `Result` alias
//! - **Constants**: defaults and environment variable names
//! - **Clock**: the monotonic time source used for all expiry math
//! - **Config**: validated configuration for limiters and caches
//! - **Traits**: the `RateLimit` seam shared by every limiter
//!
//! ## Example
//!
//! ```rust
//! use warden_core::{LimiterConfig, ttl_from_secs};
//!
//! let config = LimiterConfig { max_calls: 3, period_secs: 60.0 };
//! assert!(config.validate().is_ok());
//! assert!(ttl_from_secs(-1.0).is_zero());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod traits;

// Re-export commonly used items at crate root
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{ttl_from_secs, CacheConfig, LimiterConfig};
pub use constants::*;
pub use error::{Result, WardenError};
pub use traits::*;
