use crate::clock::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RateLimiterSnapshot {
    /// Minimum spacing enforced between two outbound calls (ms).
    pub min_spacing_ms: u64,
    /// Estimated wait before the next call may proceed (ms), if any.
    pub estimated_wait_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Requests allowed per window. Zero disables limiting.
    pub requests: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl RateLimiterConfig {
    pub fn new() -> Self {
        Self::per_minute(60)
    }

    pub fn per_minute(requests: u32) -> Self {
        Self {
            requests,
            window_secs: 60,
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window_secs = window.as_secs();
        self
    }

    /// `window / requests`; zero when limiting is disabled.
    pub fn min_spacing(&self) -> Duration {
        if self.requests == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs(self.window_secs) / self.requests
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-slot spacing limiter.
///
/// Tracks only the timestamp of the last outbound call. A burst of N
/// callers is serialized at exactly `min_spacing` regardless of prior idle
/// time; there is no accumulated budget.
pub struct SpacingRateLimiter {
    spacing: Duration,
    clock: Arc<dyn Clock>,
    last: Mutex<Option<SystemTime>>,
}

impl SpacingRateLimiter {
    pub fn new(cfg: &RateLimiterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            spacing: cfg.min_spacing(),
            clock,
            last: Mutex::new(None),
        }
    }

    /// Wait until the spacing since the previous call has elapsed, then
    /// claim the slot. Callers queue on the lock, so waits never overlap.
    pub async fn acquire(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let elapsed = self.clock.elapsed_since(prev);
            if elapsed < self.spacing {
                let wait = self.spacing - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "rate limiter delaying request");
                self.clock.sleep(wait).await;
            }
        }
        *last = Some(self.clock.now());
    }

    pub fn min_spacing(&self) -> Duration {
        self.spacing
    }

    pub async fn snapshot(&self) -> RateLimiterSnapshot {
        let last = self.last.lock().await;
        let estimated_wait_ms = last.and_then(|prev| {
            let elapsed = self.clock.elapsed_since(prev);
            (elapsed < self.spacing).then(|| (self.spacing - elapsed).as_millis() as u64)
        });
        RateLimiterSnapshot {
            min_spacing_ms: self.spacing.as_millis() as u64,
            estimated_wait_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn limiter(cfg: RateLimiterConfig) -> (Arc<ManualClock>, SpacingRateLimiter) {
        let clock = Arc::new(ManualClock::new());
        let limiter = SpacingRateLimiter::new(&cfg, clock.clone());
        (clock, limiter)
    }

    #[test]
    fn test_spacing_from_budget() {
        assert_eq!(RateLimiterConfig::default().min_spacing(), Duration::from_secs(1));
        assert_eq!(
            RateLimiterConfig::per_minute(120).min_spacing(),
            Duration::from_millis(500)
        );
        assert_eq!(RateLimiterConfig::per_minute(0).min_spacing(), Duration::ZERO);
        assert_eq!(
            RateLimiterConfig::per_minute(10)
                .with_window(Duration::from_secs(1))
                .min_spacing(),
            Duration::from_millis(100)
        );
    }

    #[tokio::test]
    async fn test_first_request_does_not_wait() {
        let (clock, limiter) = limiter(RateLimiterConfig::default());
        limiter.acquire().await;
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_burst_is_serialized_at_fixed_spacing() {
        let (clock, limiter) = limiter(RateLimiterConfig::default());
        for _ in 0..4 {
            limiter.acquire().await;
        }
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1); 3]);
    }

    #[tokio::test]
    async fn test_partial_wait_after_some_elapsed_time() {
        let (clock, limiter) = limiter(RateLimiterConfig::default());
        limiter.acquire().await;
        clock.advance(Duration::from_millis(400));
        let snapshot = limiter.snapshot().await;
        assert_eq!(snapshot.estimated_wait_ms, Some(600));
        limiter.acquire().await;
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(600)]);
    }

    #[tokio::test]
    async fn test_idle_time_does_not_accumulate_budget() {
        let (clock, limiter) = limiter(RateLimiterConfig::default());
        limiter.acquire().await;
        clock.advance(Duration::from_secs(3600));
        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1)]);
    }

    #[tokio::test]
    async fn test_zero_budget_disables_limiting() {
        let (clock, limiter) = limiter(RateLimiterConfig::per_minute(0));
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(clock.sleeps().is_empty());
        assert_eq!(limiter.snapshot().await.estimated_wait_ms, None);
    }
}
