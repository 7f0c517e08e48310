//! 流水线处理模块：把原始字节流转换为统一的流式事件。
//!
//! # Streaming Pipeline
//!
//! ```text
//! Raw Bytes → SseDecoder → map_payload → StreamChunk → collect_response
//!     │            │             │
//!   HTTP      `data:` lines   content /
//!             [DONE]          usage events
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`decode`] | SSE line decoder with `[DONE]` detection |
//! | [`event_map`] | OpenAI-style frame to [`WireEvent`] mapping |
//! | [`accumulate`] | Draining a chunk stream into text plus usage |
//!
//! Malformed frames never fail a stream: they are logged and skipped.

pub mod accumulate;
pub mod decode;
pub mod event_map;

pub use accumulate::{collect_response, CollectedResponse, UsageSummary};
pub use decode::{decode_bytes, SseDecoder, SseFrame};
pub use event_map::{map_payload, WireEvent};
