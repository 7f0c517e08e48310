//! HTTP transport for provider endpoints.

pub mod http;

pub use http::{HttpTransport, TransportError};
