//! Provider-side throughput control.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`rate_limiter`] | Fixed-spacing limiter derived from a requests-per-window budget |
//!
//! ```rust
//! use llm_relay::clock::SystemClock;
//! use llm_relay::resilience::rate_limiter::{RateLimiterConfig, SpacingRateLimiter};
//! use std::sync::Arc;
//!
//! // 60 requests per minute => one request per second
//! let limiter = SpacingRateLimiter::new(&RateLimiterConfig::per_minute(60), Arc::new(SystemClock));
//! assert_eq!(limiter.min_spacing().as_secs(), 1);
//! ```

pub mod rate_limiter;

pub use rate_limiter::{RateLimiterConfig, RateLimiterSnapshot, SpacingRateLimiter};
