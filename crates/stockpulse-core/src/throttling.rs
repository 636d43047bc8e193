use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Spaces out upstream requests: an optional shared per-second quota plus a
/// small random delay before every request so batches do not burst.
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Option<Arc<DirectRateLimiter>>,
    max_jitter: Duration,
}

impl RequestPacer {
    pub fn new(requests_per_second: Option<u32>, max_jitter: Duration) -> Self {
        let limiter = requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rate| Arc::new(RateLimiter::direct(Quota::per_second(rate))));
        Self {
            limiter,
            max_jitter,
        }
    }

    /// No quota and no jitter.
    pub fn unpaced() -> Self {
        Self::new(None, Duration::ZERO)
    }

    /// Random delay in `[0, max_jitter]`.
    pub fn jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(fastrand::u64(0..=max_ms))
    }

    /// Wait until the next request may be sent.
    pub async fn ready(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
        let delay = self.jitter();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.limiter.is_some()
    }
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer")
            .field("rate_limited", &self.is_rate_limited())
            .field("max_jitter", &self.max_jitter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_within_bound() {
        let pacer = RequestPacer::new(None, Duration::from_millis(50));
        for _ in 0..100 {
            assert!(pacer.jitter() <= Duration::from_millis(50));
        }
        assert!(!pacer.is_rate_limited());
    }

    #[test]
    fn zero_rate_disables_quota() {
        assert!(!RequestPacer::new(Some(0), Duration::ZERO).is_rate_limited());
        assert!(RequestPacer::new(Some(10), Duration::ZERO).is_rate_limited());
    }

    #[tokio::test]
    async fn unpaced_ready_returns_immediately() {
        let pacer = RequestPacer::unpaced();
        let started = std::time::Instant::now();
        pacer.ready().await;
        assert!(started.elapsed() < Duration::from_millis(50));
        assert_eq!(pacer.jitter(), Duration::ZERO);
    }
}
