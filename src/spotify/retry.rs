use std::time::Duration;

use reqwest::{StatusCode, header::HeaderMap};

/// When and how long to wait before re-sending a failed request.
///
/// Rate-limit responses (429) honor the provider's `Retry-After` header as
/// long as it stays below `max_retry_after`. Transient server errors and
/// connection failures back off exponentially from `base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            max_retry_after: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn is_transient(status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS
                | StatusCode::INTERNAL_SERVER_ERROR
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        )
    }

    /// Exponential delay for the given zero-based attempt, capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Delay before retrying a response with `status`, or `None` when the
    /// request must not be retried.
    pub fn delay_for(
        &self,
        status: StatusCode,
        retry_after: Option<Duration>,
        attempt: u32,
    ) -> Option<Duration> {
        if attempt >= self.max_retries || !Self::is_transient(status) {
            return None;
        }

        match (status, retry_after) {
            (StatusCode::TOO_MANY_REQUESTS, Some(wait)) if wait > self.max_retry_after => None,
            (StatusCode::TOO_MANY_REQUESTS, Some(wait)) => Some(wait),
            _ => Some(self.backoff(attempt)),
        }
    }

    /// Delay before retrying after a connection-level failure.
    pub fn delay_for_transport(&self, attempt: u32) -> Option<Duration> {
        (attempt < self.max_retries).then(|| self.backoff(attempt))
    }
}

/// Parses a `Retry-After` header given in whole seconds.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
