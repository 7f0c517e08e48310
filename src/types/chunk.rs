//! Normalized stream chunks emitted by every provider.

use serde::{Deserialize, Serialize};

/// One unit of the streaming output contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamChunk {
    /// Incremental fragment of model output.
    Text { text: String },
    /// Token usage and cost record.
    Usage(UsageChunk),
}

impl StreamChunk {
    pub fn text(text: impl Into<String>) -> Self {
        StreamChunk::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StreamChunk::Text { text } => Some(text),
            StreamChunk::Usage(_) => None,
        }
    }

    pub fn as_usage(&self) -> Option<&UsageChunk> {
        match self {
            StreamChunk::Usage(u) => Some(u),
            StreamChunk::Text { .. } => None,
        }
    }
}

impl From<UsageChunk> for StreamChunk {
    fn from(u: UsageChunk) -> Self {
        StreamChunk::Usage(u)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageChunk {
    pub input_tokens: u64,
    pub output_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_write_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

impl UsageChunk {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            ..Default::default()
        }
    }

    /// Usage record for a response served from the local cache.
    pub fn cache_read(tokens: u64, cost: f64) -> Self {
        Self::new(0, 0)
            .with_cache_read_tokens(tokens)
            .with_total_cost(cost)
    }

    pub fn with_cache_write_tokens(mut self, tokens: u64) -> Self {
        self.cache_write_tokens = Some(tokens);
        self
    }

    pub fn with_cache_read_tokens(mut self, tokens: u64) -> Self {
        self.cache_read_tokens = Some(tokens);
        self
    }

    pub fn with_total_cost(mut self, cost: f64) -> Self {
        self.total_cost = Some(cost);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_serializes_with_type_tag_and_omits_unset_fields() {
        let chunk: StreamChunk = UsageChunk::new(12, 0).with_cache_write_tokens(12).into();
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["type"], "usage");
        assert_eq!(json["cache_write_tokens"], 12);
        assert!(json.get("total_cost").is_none());
    }

    #[test]
    fn cache_read_chunk_has_zero_input() {
        let u = UsageChunk::cache_read(500, 0.007);
        assert_eq!(u.input_tokens, 0);
        assert_eq!(u.cache_read_tokens, Some(500));
        assert_eq!(u.total_cost, Some(0.007));
    }
}
