//! Model descriptors and the built-in registry.
//!
//! Descriptors are read-only reference data. The registry ships the DeepSeek
//! models; callers may register more.

pub mod comparison;

use crate::config::DEFAULT_MODEL_ID;
use crate::tokens::ModelPricing;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use comparison::{
    compare_models, comparison_rows, model_capabilities, ModelComparison, DEFAULT_CRITERIA,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLimits {
    pub max_output_tokens: u32,
    pub context_window: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCapabilities {
    pub supports_images: bool,
    pub supports_tool_use: bool,
    pub supports_prompt_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub pricing: ModelPricing,
    pub limits: ModelLimits,
    pub capabilities: ModelCapabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_per_second: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    /// Billions of parameters active per token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_params: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_params: Option<f64>,
    #[serde(default)]
    pub description: String,
}

impl ModelDescriptor {
    fn deepseek(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            provider: "deepseek".to_string(),
            pricing: ModelPricing::new(0.14, 0.28).with_cache_read(0.014),
            limits: ModelLimits {
                max_output_tokens: 8192,
                context_window: 64_000,
            },
            capabilities: ModelCapabilities {
                supports_images: false,
                supports_tool_use: true,
                supports_prompt_cache: true,
            },
            tokens_per_second: Some(60),
            architecture: Some("MoE".to_string()),
            activated_params: Some(37.0),
            total_params: Some(671.0),
            description: description.to_string(),
        }
    }
}

/// Lookup table keyed by model id.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelDescriptor>,
    default_id: String,
}

impl ModelRegistry {
    pub fn builtin() -> Self {
        let mut reg = Self {
            models: BTreeMap::new(),
            default_id: DEFAULT_MODEL_ID.to_string(),
        };
        reg.register(ModelDescriptor::deepseek(
            "deepseek-chat",
            "deepseek-chat",
            "DeepSeek-V3 Chat: 671B MoE model tuned for fast, high-quality responses.",
        ));
        reg.register(ModelDescriptor::deepseek(
            "deepseek-coder",
            "deepseek-coder",
            "DeepSeek-V3 Coder: specialised for programming tasks.",
        ));
        reg
    }

    pub fn register(&mut self, descriptor: ModelDescriptor) {
        self.models.insert(descriptor.id.clone(), descriptor);
    }

    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.get(id)
    }

    /// Like [`get`](Self::get), but an unknown id resolves to the default
    /// descriptor re-labelled with the requested id.
    pub fn resolve(&self, id: &str) -> ModelDescriptor {
        if let Some(found) = self.models.get(id) {
            return found.clone();
        }
        let mut fallback = self
            .models
            .get(&self.default_id)
            .cloned()
            .unwrap_or_else(|| {
                ModelDescriptor::deepseek(&self.default_id, &self.default_id, "")
            });
        fallback.id = id.to_string();
        fallback
    }

    pub fn list(&self) -> Vec<&ModelDescriptor> {
        self.models.values().collect()
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_models() {
        let reg = ModelRegistry::builtin();
        assert_eq!(reg.list().len(), 2);
        let chat = reg.get("deepseek-chat").unwrap();
        assert_eq!(chat.limits.context_window, 64_000);
        assert_eq!(chat.pricing.cache_read_per_k, Some(0.014));
        assert!(reg.get("deepseek-coder").is_some());
    }

    #[test]
    fn unknown_id_falls_back_to_default() {
        let reg = ModelRegistry::builtin();
        let m = reg.resolve("deepseek-experimental");
        assert_eq!(m.id, "deepseek-experimental");
        assert_eq!(m.name, "deepseek-chat");
        assert_eq!(m.pricing, reg.get("deepseek-chat").unwrap().pricing);
    }

    #[test]
    fn register_overrides() {
        let mut reg = ModelRegistry::builtin();
        let mut custom = reg.resolve("local-model");
        custom.pricing = ModelPricing::new(0.0, 0.0);
        reg.register(custom);
        assert_eq!(reg.get("local-model").unwrap().pricing.input_per_k, 0.0);
        assert_eq!(reg.list().len(), 3);
    }
}
