//! Batch job data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// One prompt to run against one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    pub prompt: String,
    pub model_id: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl ApiRequest {
    pub fn new(prompt: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model_id: model_id.into(),
            parameters: Map::new(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.parameters
            .insert("systemPrompt".to_string(), Value::String(system_prompt.into()));
        self
    }

    /// `parameters.systemPrompt` when it is a string, else empty.
    pub fn system_prompt(&self) -> &str {
        self.parameters
            .get("systemPrompt")
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl ApiResponse {
    pub fn ok(result: String, usage: TokenUsage) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            usage: Some(usage),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
            usage: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchJob {
    pub id: String,
    pub requests: Vec<ApiRequest>,
    pub status: BatchStatus,
    /// Percentage of requests with a recorded result, 0 to 100.
    pub progress: f64,
    pub results: Vec<ApiResponse>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl BatchJob {
    pub fn new(requests: Vec<ApiRequest>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            requests,
            status: BatchStatus::Pending,
            progress: 0.0,
            results: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_reads_system_prompt_parameter() {
        let req = ApiRequest::new("hi", "deepseek-chat").with_system_prompt("Be terse.");
        assert_eq!(req.system_prompt(), "Be terse.");
        let mut odd = ApiRequest::new("hi", "deepseek-chat");
        odd.parameters.insert("systemPrompt".into(), json!(42));
        assert_eq!(odd.system_prompt(), "");
    }

    #[test]
    fn request_yaml_uses_camel_case() {
        let reqs: Vec<ApiRequest> = serde_yaml::from_str(
            "- prompt: Explain closures\n  modelId: deepseek-coder\n  parameters:\n    systemPrompt: You teach Rust.\n- prompt: hello\n  modelId: deepseek-chat\n",
        )
        .unwrap();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].model_id, "deepseek-coder");
        assert_eq!(reqs[0].system_prompt(), "You teach Rust.");
        assert!(reqs[1].parameters.is_empty());
    }

    #[test]
    fn new_job_is_pending() {
        let job = BatchJob::new(vec![ApiRequest::new("a", "m")]);
        assert_eq!(job.status, BatchStatus::Pending);
        assert_eq!(job.progress, 0.0);
        assert!(job.results.is_empty());
        assert!(job.completed_at.is_none());
        assert!(uuid::Uuid::parse_str(&job.id).is_ok());
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["status"], "pending");
        assert!(json.get("createdAt").is_some());
    }
}
