//! Core data types: chat messages and the normalized stream chunk contract.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role and text or block content |
//! | [`MessageRole`] | `system`, `user` or `assistant` |
//! | [`StreamChunk`] | Text fragment or usage/cost record |
//! | [`UsageChunk`] | Token counts and optional cost for one usage record |
//!
//! ```rust
//! use llm_relay::types::{Message, StreamChunk, UsageChunk};
//!
//! let messages = vec![Message::user("Explain borrowing in one sentence")];
//! let chunk: StreamChunk = UsageChunk::new(42, 0).with_cache_write_tokens(42).into();
//! assert!(chunk.as_usage().is_some());
//! # let _ = messages;
//! ```

pub mod chunk;
pub mod message;

pub use chunk::{StreamChunk, UsageChunk};
pub use message::{ContentBlock, ImageSource, Message, MessageContent, MessageRole};
