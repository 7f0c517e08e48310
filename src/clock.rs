//! Injectable time source.
//!
//! The provider's cache TTL, rate limiter spacing and retry backoff all read
//! time through [`Clock`], so tests can drive them with [`ManualClock`]
//! instead of sleeping for real.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime};

#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;

    async fn sleep(&self, duration: Duration);

    /// Time elapsed since `earlier`, zero if `earlier` is in the future.
    fn elapsed_since(&self, earlier: SystemTime) -> Duration {
        self.now()
            .duration_since(earlier)
            .unwrap_or(Duration::ZERO)
    }
}

/// Wall clock backed by `SystemTime` and `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Test clock: `sleep` returns immediately and advances the clock instead.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000))
    }

    pub fn starting_at(start: SystemTime) -> Self {
        Self {
            now: Mutex::new(start),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Every duration passed to `sleep`, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manual_clock_advances_on_sleep() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.sleep(Duration::from_millis(250)).await;
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.elapsed_since(start), Duration::from_millis(1250));
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(250)]);
    }

    #[test]
    fn elapsed_since_future_is_zero() {
        let clock = ManualClock::new();
        let future = clock.now() + Duration::from_secs(5);
        assert_eq!(clock.elapsed_since(future), Duration::ZERO);
    }
}
