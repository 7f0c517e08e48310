use super::errors::remote_error;
use super::policy::{RequestClass, RequestClassifier};
use super::{ChunkStream, Provider};
use crate::cache::{
    CacheStats, CacheStore, Fingerprint, FingerprintGenerator, MemoryCacheStore, ResponseCache,
};
use crate::cancel::CancelHandle;
use crate::clock::{Clock, SystemClock};
use crate::config::ProviderConfig;
use crate::models::{ModelDescriptor, ModelRegistry};
use crate::pipeline::{map_payload, SseDecoder, SseFrame, WireEvent};
use crate::resilience::{RateLimiterSnapshot, SpacingRateLimiter};
use crate::tokens::{CharacterEstimator, ProcessTokenizer, TokenEstimator};
use crate::transport::HttpTransport;
use crate::types::{Message, MessageRole, StreamChunk, UsageChunk};
use crate::{Error, Result};
use async_stream::try_stream;
use futures::{Stream, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tracing::{debug, info, warn};

struct Inner {
    config: ProviderConfig,
    model: ModelDescriptor,
    transport: HttpTransport,
    limiter: SpacingRateLimiter,
    cache: ResponseCache,
    estimator: Arc<dyn TokenEstimator>,
    classifier: RequestClassifier,
    clock: Arc<dyn Clock>,
}

/// Adapter for DeepSeek and other OpenAI-compatible `chat/completions`
/// endpoints.
///
/// Cheap to clone; clones share the cache and the rate limiter.
#[derive(Clone)]
pub struct DeepSeekProvider {
    inner: Arc<Inner>,
}

pub struct DeepSeekProviderBuilder {
    config: ProviderConfig,
    clock: Option<Arc<dyn Clock>>,
    store: Option<Arc<dyn CacheStore>>,
    estimator: Option<Arc<dyn TokenEstimator>>,
    registry: Option<ModelRegistry>,
}

impl DeepSeekProviderBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn estimator(mut self, estimator: Arc<dyn TokenEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    pub fn registry(mut self, registry: ModelRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<DeepSeekProvider> {
        self.config.validate()?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryCacheStore::new()));
        let estimator: Arc<dyn TokenEstimator> = match (self.estimator, &self.config.tokenizer) {
            (Some(e), _) => e,
            (None, Some(tok)) => Arc::new(ProcessTokenizer::new(tok.clone())),
            (None, None) => Arc::new(CharacterEstimator::new()),
        };
        let model = self
            .registry
            .unwrap_or_default()
            .resolve(&self.config.model_id);

        let transport = HttpTransport::new(&self.config)?;
        let limiter = SpacingRateLimiter::new(&self.config.rate_limit, clock.clone());
        let cache = ResponseCache::new(self.config.cache_ttl(), store, clock.clone());
        let classifier = RequestClassifier::new(&self.config.identity_phrases);

        debug!(
            model = model.id.as_str(),
            estimator = estimator.name(),
            "deepseek provider ready"
        );

        Ok(DeepSeekProvider {
            inner: Arc::new(Inner {
                config: self.config,
                model,
                transport,
                limiter,
                cache,
                estimator,
                classifier,
                clock,
            }),
        })
    }
}

impl DeepSeekProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: ProviderConfig) -> DeepSeekProviderBuilder {
        DeepSeekProviderBuilder {
            config,
            clock: None,
            store: None,
            estimator: None,
            registry: None,
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    pub async fn rate_limiter_snapshot(&self) -> RateLimiterSnapshot {
        self.inner.limiter.snapshot().await
    }

    pub fn classify(&self, messages: &[Message]) -> RequestClass {
        self.inner.classifier.classify(messages)
    }
}

impl Provider for DeepSeekProvider {
    fn create_message_with_cancel(
        &self,
        system_prompt: &str,
        messages: &[Message],
        cancel: CancelHandle,
    ) -> ChunkStream {
        Box::pin(message_stream(
            self.inner.clone(),
            system_prompt.to_string(),
            messages.to_vec(),
            cancel,
        ))
    }

    fn model(&self) -> &ModelDescriptor {
        &self.inner.model
    }
}

impl Inner {
    fn fingerprint(&self, class: RequestClass, system_prompt: &str, messages: &[Message]) -> Fingerprint {
        let generator = match class {
            RequestClass::Task => FingerprintGenerator::new(),
            RequestClass::Identity => {
                let nanos = self
                    .clock
                    .now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos())
                    .unwrap_or_default();
                FingerprintGenerator::new().with_salt(nanos.to_string())
            }
        };
        generator.generate(system_prompt, messages)
    }

    fn request_body(&self, class: RequestClass, system_prompt: &str, messages: &[Message]) -> Value {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        if !system_prompt.is_empty() {
            wire.push(json!({ "role": "system", "content": system_prompt }));
        }
        for m in messages {
            let role = match m.role {
                MessageRole::Assistant => "assistant",
                MessageRole::User | MessageRole::System => "user",
            };
            wire.push(json!({ "role": role, "content": m.text() }));
        }
        json!({
            "model": self.config.model_id,
            "messages": wire,
            "stream": true,
            "temperature": class.temperature(),
        })
    }
}

fn message_stream(
    inner: Arc<Inner>,
    system_prompt: String,
    messages: Vec<Message>,
    cancel: CancelHandle,
) -> impl Stream<Item = Result<StreamChunk>> + Send + 'static {
    try_stream! {
        let class = inner.classifier.classify(&messages);
        let pricing = inner.model.pricing.clone();
        let model_id = inner.model.id.clone();
        let mut attempt: u32 = 0;

        'attempts: loop {
            attempt += 1;
            if cancel.is_cancelled() {
                Err::<(), Error>(Error::Cancelled)?;
            }

            inner.limiter.acquire().await;
            let fingerprint = inner.fingerprint(class, &system_prompt, &messages);

            if class.is_cacheable() {
                if let Some(chunks) = inner.cache.get(&fingerprint) {
                    match inner.estimator.count_messages(&system_prompt, &messages).await {
                        Ok(tokens) => {
                            debug!(
                                model = model_id.as_str(),
                                fingerprint = fingerprint.short(),
                                "serving response from cache"
                            );
                            let cost = pricing.cache_read_cost(tokens.input_tokens);
                            yield StreamChunk::Usage(UsageChunk::cache_read(tokens.input_tokens, cost));
                            for chunk in chunks {
                                yield chunk;
                            }
                            return;
                        }
                        Err(e) => {
                            warn!(error = %e, "failed to process cached response, requesting fresh");
                        }
                    }
                }
            }

            match inner.estimator.count_messages(&system_prompt, &messages).await {
                Ok(tokens) => {
                    yield StreamChunk::Usage(
                        UsageChunk::new(tokens.input_tokens, 0)
                            .with_cache_write_tokens(tokens.input_tokens),
                    );
                }
                Err(e) => {
                    warn!(error = %e, "failed to estimate input tokens");
                }
            }

            let body = inner.request_body(class, &system_prompt, &messages);
            let url = inner.transport.chat_completions_url();
            let started = inner.clock.now();
            let response = inner.transport.post_stream(&body).await?;
            let status = response.status();

            if status.as_u16() == 429 {
                if attempt > inner.config.max_rate_limit_retries {
                    warn!(model = model_id.as_str(), attempt, "rate limit retries exhausted");
                    Err::<(), Error>(Error::RateLimited { attempts: attempt })?;
                }
                let backoff = inner.config.rate_limit_backoff();
                info!(
                    model = model_id.as_str(),
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "rate limited, retrying"
                );
                inner.clock.sleep(backoff).await;
                continue 'attempts;
            }

            let response = if status.is_success() {
                response
            } else {
                let status_text = status.canonical_reason().unwrap_or("").to_string();
                let text = response.text().await.unwrap_or_default();
                warn!(model = model_id.as_str(), status = status.as_u16(), "request failed");
                Err::<reqwest::Response, Error>(remote_error(status.as_u16(), &status_text, &text, &url))?
            };

            let mut frames = SseDecoder::new().decode_stream(inner.transport.byte_stream(response));
            let mut recorded: Vec<StreamChunk> = Vec::new();

            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    frame = frames.next() => Some(frame),
                };
                let frame = match next {
                    None => {
                        debug!(model = model_id.as_str(), "stream cancelled");
                        Err::<(), Error>(Error::Cancelled)?;
                        return;
                    }
                    Some(None) => {
                        debug!(model = model_id.as_str(), "stream ended without completion marker");
                        return;
                    }
                    Some(Some(item)) => item?,
                };

                let payload = match frame {
                    SseFrame::Done => {
                        info!(
                            model = model_id.as_str(),
                            attempt,
                            duration_ms = inner.clock.elapsed_since(started).as_millis() as u64,
                            "stream completed"
                        );
                        if class.is_cacheable() {
                            inner.cache.put(fingerprint, recorded);
                        }
                        return;
                    }
                    SseFrame::Data(payload) => payload,
                };

                let events = match map_payload(&payload) {
                    Ok(events) => events,
                    Err(message) => {
                        warn!(model = model_id.as_str(), error = message.as_str(), "provider reported an in-stream error");
                        continue;
                    }
                };

                for event in events {
                    match event {
                        WireEvent::Content(text) => {
                            let chunk = StreamChunk::text(text.clone());
                            recorded.push(chunk.clone());
                            yield chunk;
                            match inner.estimator.count(&text).await {
                                Ok(n) => {
                                    let usage = StreamChunk::Usage(
                                        UsageChunk::new(0, n).with_total_cost(pricing.output_cost(n)),
                                    );
                                    recorded.push(usage.clone());
                                    yield usage;
                                }
                                Err(e) => {
                                    warn!(error = %e, "failed to count output tokens");
                                }
                            }
                        }
                        WireEvent::Usage { prompt_tokens, completion_tokens } => {
                            let usage = StreamChunk::Usage(
                                UsageChunk::new(prompt_tokens, completion_tokens)
                                    .with_total_cost(pricing.cost(prompt_tokens, completion_tokens)),
                            );
                            recorded.push(usage.clone());
                            yield usage;
                        }
                    }
                }
            }
        }
    }
}
