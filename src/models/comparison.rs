//! Side-by-side model comparison.

use super::ModelDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_CRITERIA: &[&str] = &[
    "context_length",
    "max_tokens",
    "input_cost",
    "output_cost",
    "tokens_per_second",
];

/// Flattened view of a descriptor, one row per model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub context_length: u32,
    pub max_tokens: u32,
    pub input_cost: f64,
    pub output_cost: f64,
    pub tokens_per_second: Option<u32>,
    pub architecture: Option<String>,
    pub activated_params: Option<f64>,
    pub total_params: Option<f64>,
    pub supports_images: bool,
    pub supports_tool_use: bool,
    pub supports_prompt_cache: bool,
}

impl ModelComparison {
    pub fn from_descriptor(m: &ModelDescriptor) -> Self {
        Self {
            id: m.id.clone(),
            name: m.name.clone(),
            provider: m.provider.clone(),
            context_length: m.limits.context_window,
            max_tokens: m.limits.max_output_tokens,
            input_cost: m.pricing.input_per_k,
            output_cost: m.pricing.output_per_k,
            tokens_per_second: m.tokens_per_second,
            architecture: m.architecture.clone(),
            activated_params: m.activated_params,
            total_params: m.total_params,
            supports_images: m.capabilities.supports_images,
            supports_tool_use: m.capabilities.supports_tool_use,
            supports_prompt_cache: m.capabilities.supports_prompt_cache,
        }
    }
}

pub fn comparison_rows<'a, I>(models: I) -> Vec<ModelComparison>
where
    I: IntoIterator<Item = &'a ModelDescriptor>,
{
    models.into_iter().map(ModelComparison::from_descriptor).collect()
}

/// Project each row onto `id`, `name`, `provider` plus the requested
/// criteria. Unknown criteria map to `null`.
pub fn compare_models(rows: &[ModelComparison], criteria: &[&str]) -> Vec<Map<String, Value>> {
    rows.iter()
        .map(|row| {
            let full = match serde_json::to_value(row) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            };
            let mut out = Map::new();
            for key in ["id", "name", "provider"].iter().chain(criteria.iter()) {
                out.insert(
                    key.to_string(),
                    full.get(*key).cloned().unwrap_or(Value::Null),
                );
            }
            out
        })
        .collect()
}

pub fn model_capabilities(row: &ModelComparison) -> Vec<String> {
    let mut caps = Vec::new();
    if row.supports_images {
        caps.push("Image Processing".to_string());
    }
    if row.supports_tool_use {
        caps.push("Tool Use".to_string());
    }
    if row.supports_prompt_cache {
        caps.push("Prompt Caching".to_string());
    }
    if row.tokens_per_second.map_or(false, |tps| tps >= 50) {
        caps.push("High Performance".to_string());
    }
    if row.context_length >= 100_000 {
        caps.push("Long Context".to_string());
    }
    if row.architecture.as_deref() == Some("MoE") {
        caps.push("Mixture of Experts".to_string());
        if let (Some(active), Some(total)) = (row.activated_params, row.total_params) {
            caps.push(format!(
                "{:.1}B Active / {:.1}B Total Parameters",
                active, total
            ));
        }
    }
    caps
}
