//! 模型提供方适配层：统一的流式消息接口。
//!
//! # Provider Adapters
//!
//! A [`Provider`] turns a system prompt plus a message list into a finite,
//! single-pass stream of [`StreamChunk`]s. Consumers must drain the stream to
//! guarantee cache population and final cost accounting.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Provider`] | The streaming contract every adapter implements |
//! | [`DeepSeekProvider`] | OpenAI-compatible adapter with caching, rate limiting and cost tracking |
//! | [`RequestClassifier`] | Task vs. identity classification driving cache and temperature |
//!
//! ## Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use llm_relay::provider::{DeepSeekProvider, Provider};
//! use llm_relay::types::{Message, StreamChunk};
//! use llm_relay::ProviderConfig;
//!
//! # async fn run() -> llm_relay::Result<()> {
//! let provider = DeepSeekProvider::new(ProviderConfig::from_env()?)?;
//! let mut stream = provider.create_message("You are terse.", &[Message::user("2+2?")]);
//! while let Some(chunk) = stream.next().await {
//!     if let StreamChunk::Text { text } = chunk? {
//!         print!("{text}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod deepseek;
pub mod errors;
pub mod policy;

use crate::cancel::CancelHandle;
use crate::models::ModelDescriptor;
use crate::types::{Message, StreamChunk};
use crate::BoxStream;

pub use deepseek::{DeepSeekProvider, DeepSeekProviderBuilder};
pub use policy::{RequestClass, RequestClassifier, IDENTITY_TEMPERATURE, TASK_TEMPERATURE};

/// Stream of normalized output chunks. Transport, remote and rate-limit
/// errors terminate it with a single `Err` item.
pub type ChunkStream = BoxStream<'static, StreamChunk>;

pub trait Provider: Send + Sync {
    fn create_message(&self, system_prompt: &str, messages: &[Message]) -> ChunkStream {
        self.create_message_with_cancel(system_prompt, messages, CancelHandle::new())
    }

    /// Like [`create_message`](Provider::create_message); once `cancel`
    /// fires the stream yields [`crate::Error::Cancelled`] and ends without
    /// populating any cache.
    fn create_message_with_cancel(
        &self,
        system_prompt: &str,
        messages: &[Message],
        cancel: CancelHandle,
    ) -> ChunkStream;

    fn model(&self) -> &ModelDescriptor;
}
