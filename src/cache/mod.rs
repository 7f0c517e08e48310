//! 响应缓存模块：按请求指纹缓存已完成的流式响应。
//!
//! # Response Caching Module
//!
//! Completed chunk sequences are stored under a [`Fingerprint`] of the
//! logical request (system prompt plus messages) and replayed verbatim when
//! the same request is made again within the TTL.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ResponseCache`] | TTL policy, purge-on-write sweep and statistics |
//! | [`CacheStore`] | Storage seam, injectable for tests |
//! | [`MemoryCacheStore`] | Default in-memory store |
//! | [`NullCacheStore`] | No-op store for disabling caching |
//! | [`FingerprintGenerator`] | SHA-256 keys over canonical request JSON |
//!
//! ## Example
//!
//! ```rust
//! use llm_relay::cache::{FingerprintGenerator, ResponseCache};
//! use llm_relay::types::{Message, StreamChunk};
//!
//! let cache = ResponseCache::in_memory();
//! let key = FingerprintGenerator::new().generate("", &[Message::user("hello")]);
//! cache.put(key.clone(), vec![StreamChunk::text("hi there")]);
//! assert!(cache.get(&key).is_some());
//! ```

mod backend;
mod key;
mod manager;

pub use backend::{CacheEntry, CacheStore, MemoryCacheStore, NullCacheStore};
pub use key::{Fingerprint, FingerprintGenerator};
pub use manager::{CacheStats, ResponseCache, DEFAULT_TTL};
