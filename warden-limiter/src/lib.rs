//! # Warden Limiter
//!
//! Per-key sliding-window rate limiting.
//!
//! A key is admitted when fewer than `max_calls` of its previously admitted
//! calls fall inside the trailing `period`. The window slides with every
//! check rather than snapping to fixed buckets, so no boundary lets through
//! a double burst.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use warden_limiter::SlidingWindowLimiter;
//!
//! # tokio_test::block_on(async {
//! let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60)).unwrap();
//! assert!(limiter.is_allowed("login:alice").await);
//! assert!(limiter.is_allowed("login:alice").await);
//! assert!(!limiter.is_allowed("login:alice").await);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod allow_all;
mod sliding_window;

pub use allow_all::AllowAll;
pub use sliding_window::SlidingWindowLimiter;

use std::sync::Arc;

use tracing::warn;
use warden_core::{LimiterConfig, RateLimit, Result};

/// Builds the limiter a call site should use.
///
/// With `bypass` set (test and CI environments) the result admits every
/// call and keeps no history; the configuration is still validated so a bad
/// value surfaces in tests too.
pub fn build_limiter(config: &LimiterConfig, bypass: bool) -> Result<Arc<dyn RateLimit>> {
    config.validate()?;
    if bypass {
        warn!("Rate limiting disabled; every call will be admitted");
        return Ok(Arc::new(AllowAll));
    }
    Ok(Arc::new(SlidingWindowLimiter::from_config(config)?))
}
