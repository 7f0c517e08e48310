//! Batch processor.

use super::job::{ApiRequest, ApiResponse, BatchJob, BatchStatus, TokenUsage};
use crate::cancel::CancelHandle;
use crate::pipeline::collect_response;
use crate::provider::Provider;
use crate::types::Message;
use crate::Error;
use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const CANCELLED: &str = "cancelled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Slice width: requests dispatched together.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
    /// Additional attempts after the first failure.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
    #[serde(default, with = "millis")]
    pub retry_delay: Duration,
}

fn default_max_concurrent() -> usize {
    5
}
fn default_retry_limit() -> u32 {
    3
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent(),
            retry_limit: default_retry_limit(),
            retry_delay: Duration::ZERO,
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_max_concurrent_requests(mut self, n: usize) -> Self {
        self.max_concurrent_requests = n.max(1);
        self
    }
    pub fn with_retry_limit(mut self, n: u32) -> Self {
        self.retry_limit = n;
        self
    }
    pub fn with_retry_delay(mut self, d: Duration) -> Self {
        self.retry_delay = d;
        self
    }
}

/// Fans a job's requests out to providers keyed by model id.
pub struct BatchProcessor {
    providers: HashMap<String, Arc<dyn Provider>>,
    config: BatchConfig,
}

impl BatchProcessor {
    /// Later providers win when two report the same model id.
    pub fn new(providers: Vec<Arc<dyn Provider>>, config: BatchConfig) -> Self {
        let providers = providers
            .into_iter()
            .map(|p| (p.model().id.clone(), p))
            .collect();
        Self { providers, config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn create_job(requests: Vec<ApiRequest>) -> BatchJob {
        BatchJob::new(requests)
    }

    pub async fn process_batch<'j>(&self, job: &'j mut BatchJob) -> &'j mut BatchJob {
        self.process_batch_observed(job, &CancelHandle::new(), |_| {})
            .await
    }

    pub async fn process_batch_with_cancel<'j>(
        &self,
        job: &'j mut BatchJob,
        cancel: &CancelHandle,
    ) -> &'j mut BatchJob {
        self.process_batch_observed(job, cancel, |_| {}).await
    }

    /// Run the job, calling `on_progress` after every slice.
    pub async fn process_batch_observed<'j, F>(
        &self,
        job: &'j mut BatchJob,
        cancel: &CancelHandle,
        mut on_progress: F,
    ) -> &'j mut BatchJob
    where
        F: FnMut(f64),
    {
        job.status = BatchStatus::Processing;
        job.results.clear();
        let total = job.requests.len();
        let width = self.config.max_concurrent_requests.max(1);
        info!(job = job.id.as_str(), total, width, "batch started");

        let mut results = Vec::with_capacity(total);
        for slice in job.requests.chunks(width) {
            if cancel.is_cancelled() {
                break;
            }
            let slice_results =
                join_all(slice.iter().map(|req| self.process_request(req, cancel))).await;
            results.extend(slice_results);
            job.progress = results.len() as f64 / total as f64 * 100.0;
            debug!(job = job.id.as_str(), progress = job.progress, "slice finished");
            on_progress(job.progress);
        }

        let cancelled = results.len() < total;
        results.resize_with(total, || ApiResponse::failed(CANCELLED));
        job.results = results;
        job.progress = 100.0;
        job.completed_at = Some(Utc::now());
        job.status = if cancelled {
            warn!(job = job.id.as_str(), "batch cancelled");
            BatchStatus::Failed
        } else {
            BatchStatus::Completed
        };
        info!(
            job = job.id.as_str(),
            succeeded = job.succeeded(),
            failed = job.failed(),
            "batch finished"
        );
        job
    }

    async fn process_request(&self, request: &ApiRequest, cancel: &CancelHandle) -> ApiResponse {
        let Some(provider) = self.providers.get(&request.model_id) else {
            return ApiResponse::failed(
                Error::NoHandler {
                    model_id: request.model_id.clone(),
                }
                .to_string(),
            );
        };

        let messages = [Message::user(request.prompt.clone())];
        let mut attempt = 0u32;
        loop {
            let stream =
                provider.create_message_with_cancel(request.system_prompt(), &messages, cancel.clone());
            let err = match collect_response(stream).await {
                Ok(collected) => {
                    let usage = collected
                        .usage
                        .map(|u| TokenUsage {
                            input_tokens: u.input_tokens,
                            output_tokens: u.output_tokens,
                        })
                        .unwrap_or_default();
                    return ApiResponse::ok(collected.text, usage);
                }
                Err(e) => e,
            };

            if matches!(err, Error::Cancelled) || cancel.is_cancelled() {
                return ApiResponse::failed(CANCELLED);
            }
            if attempt >= self.config.retry_limit {
                warn!(model = request.model_id.as_str(), attempts = attempt + 1, error = %err, "request failed");
                return ApiResponse::failed(err.to_string());
            }
            attempt += 1;
            debug!(model = request.model_id.as_str(), attempt, error = %err, "retrying request");
            if !self.config.retry_delay.is_zero() {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }
    }
}
