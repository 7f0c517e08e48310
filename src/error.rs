use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for configuration and validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Configuration key that caused the error (e.g. "provider.api_key")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g. expected type, actual value)
    pub details: Option<String>,
    /// Component that raised the error (e.g. "provider_builder")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the relay runtime.
///
/// Transport, remote and rate-limit errors are fatal to a stream. Estimation
/// errors are always absorbed by the provider and only surface from the
/// [`crate::tokens`] API itself.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("API request failed: network error - {source} (URL: {url})")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("API error: {message}")]
    Remote { status: u16, message: String },

    #[error("API rate limit exceeded after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("Token estimation failed: {0}")]
    Estimation(String),

    #[error("No handler found for model {model_id}")]
    NoHandler { model_id: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Wrap a transport failure with the URL it was targeting.
    pub fn transport(url: impl Into<String>, source: TransportError) -> Self {
        Error::Transport {
            url: url.into(),
            source,
        }
    }

    /// HTTP status of a remote failure, if this error came from the provider.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            Error::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_renders_context() {
        let err = Error::configuration_with_context(
            "API key is required",
            ErrorContext::new()
                .with_field_path("api_key")
                .with_source("provider_builder"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: API key is required (field: api_key, source: provider_builder)"
        );
        assert_eq!(err.context().unwrap().field_path.as_deref(), Some("api_key"));
    }

    #[test]
    fn transport_error_mentions_url() {
        let err = Error::transport(
            "https://example.invalid/chat/completions",
            TransportError::Other("connection refused".into()),
        );
        let msg = err.to_string();
        assert!(msg.contains("network error"));
        assert!(msg.contains("URL: https://example.invalid/chat/completions"));
    }

    #[test]
    fn status_is_exposed_for_remote_errors() {
        let err = Error::Remote {
            status: 401,
            message: "Unauthorized".into(),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(Error::RateLimited { attempts: 3 }.status(), Some(429));
        assert_eq!(Error::Cancelled.status(), None);
    }
}
