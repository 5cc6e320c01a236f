//! A limiter that admits everything.

use async_trait::async_trait;
use warden_core::RateLimit;

/// Admits every call and records nothing.
///
/// Stands in for a real limiter in test environments.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

#[async_trait]
impl RateLimit for AllowAll {
    async fn is_allowed(&self, _key: &str) -> bool {
        true
    }

    async fn reset(&self, _key: Option<&str>) {}
}
