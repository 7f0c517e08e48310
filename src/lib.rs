//! # llm-relay
//!
//! 流式大模型客户端与批处理运行时：统一的流式输出、用量与成本统计、响应缓存和限流。
//!
//! Streaming LLM client and batch orchestration runtime for OpenAI-compatible
//! `chat/completions` endpoints (DeepSeek by default).
//!
//! ## Overview
//!
//! A caller sends a system prompt plus conversational messages and receives a
//! normalized, incremental stream of [`StreamChunk`]s: text fragments
//! interleaved with token usage and cost records. Repeated prompts are served
//! from a local response cache, outbound calls are spaced by a rate limiter,
//! and many requests can be run together through the [`batch`] layer.
//!
//! ## Key Features
//!
//! - **Unified Stream**: every provider emits the same [`StreamChunk`] contract
//! - **Cost Tracking**: pre-flight, per-increment and authoritative usage records
//! - **Caching**: 24 h response cache keyed by request fingerprint via [`cache`]
//! - **Rate Limiting**: single-slot spacing limiter via [`resilience`]
//! - **Batching**: bounded fan-out with retries via [`batch`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_relay::provider::{DeepSeekProvider, Provider};
//! use llm_relay::{collect_response, Message, ProviderConfig};
//!
//! #[tokio::main]
//! async fn main() -> llm_relay::Result<()> {
//!     let provider = DeepSeekProvider::new(ProviderConfig::from_env()?)?;
//!     let stream = provider.create_message("", &[Message::user("Hello, how are you?")]);
//!     let response = collect_response(stream).await?;
//!     println!("{}", response.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`provider`] | Streaming provider contract and the DeepSeek adapter |
//! | [`pipeline`] | SSE decoding, frame mapping and stream collection |
//! | [`batch`] | Batch jobs with bounded concurrency and retries |
//! | [`cache`] | Fingerprint-keyed response cache |
//! | [`resilience`] | Rate limiting |
//! | [`tokens`] | Token estimation and pricing |
//! | [`models`] | Model descriptors, registry and comparison |
//! | [`types`] | Messages and stream chunks |

pub mod batch;
pub mod cache;
pub mod cancel;
pub mod clock;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod resilience;
pub mod tokens;
pub mod transport;
pub mod types;

pub use cancel::CancelHandle;
pub use config::ProviderConfig;
pub use pipeline::{collect_response, CollectedResponse};
pub use provider::{ChunkStream, DeepSeekProvider, Provider};
pub use types::{
    chunk::{StreamChunk, UsageChunk},
    message::{Message, MessageRole},
};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
