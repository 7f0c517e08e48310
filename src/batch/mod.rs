//! 批处理模块：以有限并发和重试执行大量请求。
//!
//! # Batch Processing Module
//!
//! A [`BatchJob`] holds an ordered list of [`ApiRequest`]s. The
//! [`BatchProcessor`] runs them in slices of `max_concurrent_requests`,
//! retrying failures up to `retry_limit` extra times, and records exactly one
//! [`ApiResponse`] per request in request order. A job never aborts early:
//! failed items show up as `success: false` while the job completes.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`BatchProcessor`] | Slice-by-slice fan-out over providers keyed by model id |
//! | [`BatchConfig`] | Slice width, retry limit and retry delay |
//! | [`BatchJob`] | Requests, status, progress and results |
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use llm_relay::batch::{ApiRequest, BatchConfig, BatchProcessor};
//! use llm_relay::provider::{DeepSeekProvider, Provider};
//! use llm_relay::ProviderConfig;
//!
//! # async fn run() -> llm_relay::Result<()> {
//! let provider: Arc<dyn Provider> = Arc::new(DeepSeekProvider::new(ProviderConfig::from_env()?)?);
//! let processor = BatchProcessor::new(vec![provider], BatchConfig::default());
//!
//! let mut job = BatchProcessor::create_job(vec![
//!     ApiRequest::new("Summarize RFC 2616", "deepseek-chat"),
//!     ApiRequest::new("Explain lifetimes", "deepseek-chat").with_system_prompt("Be brief."),
//! ]);
//! processor.process_batch(&mut job).await;
//! assert_eq!(job.results.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Cancellation
//!
//! [`BatchProcessor::process_batch_with_cancel`] stops dispatching new slices
//! once the handle fires. Requests that never ran are recorded as failed with
//! the error `"cancelled"` and the job ends in [`BatchStatus::Failed`].

mod job;
mod processor;

pub use job::{ApiRequest, ApiResponse, BatchJob, BatchStatus, TokenUsage};
pub use processor::{BatchConfig, BatchProcessor};
