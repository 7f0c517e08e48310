//! Token 计数与成本估算模块。
//!
//! # Token Counting and Cost Estimation Module
//!
//! Token counts drive the usage chunks a provider emits: the pre-flight
//! input estimate, per-increment output counts and the cache-read record.
//! Estimation never makes a network call.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`TokenEstimator`] | Async counting trait |
//! | [`CharacterEstimator`] | In-process approximation (4 chars ≈ 1 token) |
//! | [`ProcessTokenizer`] | Delegates to an external tokenizer process |
//! | [`ModelPricing`] | Per-1K-token prices and cost arithmetic |
//!
//! ## Example
//!
//! ```rust
//! use llm_relay::tokens::{CharacterEstimator, ModelPricing, TokenEstimator};
//!
//! # tokio_test_block(async {
//! let tokens = CharacterEstimator::new().count("Hello, how are you?").await.unwrap();
//! let cost = ModelPricing::new(0.14, 0.28).cost(tokens, 0);
//! assert!(cost > 0.0);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```
//!
//! Failures from [`ProcessTokenizer`] surface as [`crate::Error::Estimation`];
//! providers log and skip the affected chunk rather than failing the stream.

mod counter;
mod pricing;
mod process;

pub use counter::{CharacterEstimator, MessageTokens, TokenEstimator};
pub use pricing::ModelPricing;
pub use process::{ProcessTokenizer, TokenizerConfig};
