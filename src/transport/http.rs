use crate::config::ProviderConfig;
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use tracing::debug;

/// Streaming HTTP client for OpenAI-compatible `chat/completions` endpoints.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(
                env::var("LLM_RELAY_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(32),
            )
            .pool_idle_timeout(Some(Duration::from_secs(
                env::var("LLM_RELAY_HTTP_POOL_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(90),
            )));

        if let Some(proxy_url) = config
            .proxy_url
            .clone()
            .or_else(|| env::var("LLM_RELAY_PROXY_URL").ok())
        {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build().map_err(|e| {
            Error::transport(config.base_url.clone(), TransportError::Other(e.to_string()))
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// POST a streaming request. Any HTTP status is returned as a response;
    /// only connection-level failures are errors here.
    pub async fn post_stream(&self, body: &serde_json::Value) -> Result<reqwest::Response> {
        let url = self.chat_completions_url();
        debug!(url = url.as_str(), "sending streaming request");
        self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("accept", "text/event-stream")
            .json(body)
            .send()
            .await
            .map_err(|e| Error::transport(url, TransportError::Http(e)))
    }

    /// Convert a response body into the unified byte stream.
    pub fn byte_stream(&self, resp: reqwest::Response) -> BoxStream<'static, Bytes> {
        let url = resp.url().to_string();
        let stream = resp
            .bytes_stream()
            .map_err(move |e| Error::transport(url.clone(), TransportError::Http(e)));
        Box::pin(stream)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completions_url_drops_trailing_slash() {
        let cfg = ProviderConfig::new("sk-test").with_base_url("http://localhost:9/v1/");
        let transport = HttpTransport::new(&cfg).unwrap();
        assert_eq!(
            transport.chat_completions_url(),
            "http://localhost:9/v1/chat/completions"
        );
    }
}
