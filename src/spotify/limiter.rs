use std::{num::NonZeroU32, sync::Arc};

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

/// Sustained request rate and burst allowance for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub requests_per_second: NonZeroU32,
    pub burst: NonZeroU32,
}

impl RateLimit {
    pub fn per_second(requests_per_second: NonZeroU32) -> Self {
        Self {
            requests_per_second,
            burst: NonZeroU32::MIN,
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::per_second(NonZeroU32::new(2).unwrap_or(NonZeroU32::MIN))
    }
}

/// A direct (unkeyed) rate limiter shared by every request sent to the
/// provider. Clones share the same bucket.
#[derive(Clone)]
pub struct Limiter {
    inner: Option<Arc<DefaultDirectRateLimiter>>,
}

impl Limiter {
    pub fn new(rate: RateLimit) -> Self {
        let quota = Quota::per_second(rate.requests_per_second).allow_burst(rate.burst);
        Self {
            inner: Some(Arc::new(RateLimiter::direct(quota))),
        }
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self { inner: None }
    }

    /// Waits until the bucket admits one more request.
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.inner {
            limiter.until_ready().await;
        }
    }

    pub fn is_limited(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for Limiter {
    fn default() -> Self {
        Self::new(RateLimit::default())
    }
}

impl std::fmt::Debug for Limiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Limiter")
            .field("limited", &self.is_limited())
            .finish()
    }
}
