//! Provider configuration.
//!
//! Values come from a YAML document or from the environment. Everything but
//! the API key has a working default, so `ProviderConfig::new(key)` is enough
//! to talk to the public DeepSeek endpoint.

use crate::error::ErrorContext;
use crate::resilience::RateLimiterConfig;
use crate::tokens::TokenizerConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL_ID: &str = "deepseek-chat";

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default)]
    pub rate_limit: RateLimiterConfig,
    /// Wait before restarting an attempt after a 429.
    #[serde(default = "default_backoff_ms")]
    pub rate_limit_backoff_ms: u64,
    #[serde(default = "default_max_rate_limit_retries")]
    pub max_rate_limit_retries: u32,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    /// Lowercase phrases that mark a request as an identity question.
    #[serde(default = "default_identity_phrases")]
    pub identity_phrases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<TokenizerConfig>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}
fn default_backoff_ms() -> u64 {
    1000
}
fn default_max_rate_limit_retries() -> u32 {
    5
}
fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_identity_phrases() -> Vec<String> {
    vec!["who are you".to_string()]
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            model_id: default_model_id(),
            rate_limit: RateLimiterConfig::default(),
            rate_limit_backoff_ms: default_backoff_ms(),
            max_rate_limit_retries: default_max_rate_limit_retries(),
            cache_ttl_secs: default_cache_ttl_secs(),
            timeout_secs: default_timeout_secs(),
            proxy_url: None,
            identity_phrases: default_identity_phrases(),
            tokenizer: None,
        }
    }

    /// Build from `DEEPSEEK_*` and `LLM_RELAY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("DEEPSEEK_API_KEY").unwrap_or_default();
        let mut cfg = Self::new(api_key);
        if let Ok(url) = env::var("DEEPSEEK_BASE_URL") {
            cfg.base_url = url;
        }
        if let Ok(model) = env::var("DEEPSEEK_MODEL_ID") {
            cfg.model_id = model;
        }
        if let Some(secs) = env::var("LLM_RELAY_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            cfg.timeout_secs = secs;
        }
        cfg.proxy_url = env::var("LLM_RELAY_PROXY_URL").ok();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw).map_err(|e| match e {
            Error::Configuration { message, context } => Error::configuration_with_context(
                message,
                context.with_source(path.display().to_string()),
            ),
            other => other,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "DeepSeek API key is required",
                ErrorContext::new()
                    .with_field_path("api_key")
                    .with_details("set api_key or the DEEPSEEK_API_KEY environment variable"),
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::configuration_with_context(
                format!("invalid base URL: {}", self.base_url),
                ErrorContext::new().with_field_path("base_url"),
            ));
        }
        if self.model_id.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "model id must not be empty",
                ErrorContext::new().with_field_path("model_id"),
            ));
        }
        Ok(())
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimiterConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_rate_limit_backoff(mut self, backoff: Duration) -> Self {
        self.rate_limit_backoff_ms = backoff.as_millis() as u64;
        self
    }

    pub fn with_max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.max_rate_limit_retries = retries;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_identity_phrases(mut self, phrases: Vec<String>) -> Self {
        self.identity_phrases = phrases;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerConfig) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_millis(self.rate_limit_backoff_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .field("rate_limit", &self.rate_limit)
            .field("rate_limit_backoff_ms", &self.rate_limit_backoff_ms)
            .field("max_rate_limit_retries", &self.max_rate_limit_retries)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("timeout_secs", &self.timeout_secs)
            .field("proxy_url", &self.proxy_url)
            .field("identity_phrases", &self.identity_phrases)
            .field("tokenizer", &self.tokenizer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_fills_defaults() {
        let cfg = ProviderConfig::from_yaml_str("api_key: sk-abc\n").unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.model_id, DEFAULT_MODEL_ID);
        assert_eq!(cfg.max_rate_limit_retries, 5);
        assert_eq!(cfg.rate_limit_backoff(), Duration::from_secs(1));
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(86_400));
        assert_eq!(cfg.identity_phrases, vec!["who are you".to_string()]);
        assert_eq!(cfg.rate_limit.requests, 60);
    }

    #[test]
    fn yaml_overrides_and_tokenizer() {
        let cfg = ProviderConfig::from_yaml_str(
            r#"
api_key: sk-abc
model_id: deepseek-coder
rate_limit:
  requests: 30
  window_secs: 60
tokenizer:
  script_path: /opt/tok/count.py
"#,
        )
        .unwrap();
        assert_eq!(cfg.model_id, "deepseek-coder");
        assert_eq!(cfg.rate_limit.min_spacing(), Duration::from_secs(2));
        let tok = cfg.tokenizer.unwrap();
        assert_eq!(tok.candidates, vec!["python3", "python"]);
        assert!(tok.interpreter.is_none());
    }

    #[test]
    fn missing_key_is_configuration_error() {
        let err = ProviderConfig::new("  ").validate().unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("api_key")
        );
    }

    #[test]
    fn bad_url_is_rejected() {
        let err = ProviderConfig::new("k")
            .with_base_url("api.deepseek.com")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("invalid base URL"));
    }

    #[test]
    fn debug_redacts_key() {
        let printed = format!("{:?}", ProviderConfig::new("sk-secret"));
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
