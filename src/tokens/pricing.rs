//! Per-model pricing and cost arithmetic.

use serde::{Deserialize, Serialize};

/// Prices per 1000 tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input_per_k: f64,
    pub output_per_k: f64,
    /// Price for input served from cache; falls back to `input_per_k`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_per_k: Option<f64>,
}

impl ModelPricing {
    pub fn new(input_per_k: f64, output_per_k: f64) -> Self {
        Self {
            input_per_k,
            output_per_k,
            cache_read_per_k: None,
        }
    }

    pub fn with_cache_read(mut self, per_k: f64) -> Self {
        self.cache_read_per_k = Some(per_k);
        self
    }

    /// `(input/1000)*input_per_k + (output/1000)*output_per_k`
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 / 1000.0) * self.input_per_k
            + (output_tokens as f64 / 1000.0) * self.output_per_k
    }

    pub fn output_cost(&self, output_tokens: u64) -> f64 {
        self.cost(0, output_tokens)
    }

    pub fn cache_read_cost(&self, tokens: u64) -> f64 {
        (tokens as f64 / 1000.0) * self.cache_read_per_k.unwrap_or(self.input_per_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn cost_formula() {
        let p = ModelPricing::new(0.14, 0.28);
        assert!((p.cost(1000, 1000) - 0.42).abs() < EPS);
        assert!((p.cost(500, 0) - 0.07).abs() < EPS);
        assert!((p.output_cost(250) - 0.07).abs() < EPS);
    }

    #[test]
    fn cache_read_uses_its_own_price() {
        let p = ModelPricing::new(0.14, 0.28).with_cache_read(0.014);
        for r in [0u64, 1, 999, 1234, 64_000] {
            let expected = (r as f64 / 1000.0) * 0.014;
            assert!((p.cache_read_cost(r) - expected).abs() < EPS);
        }
        let no_discount = ModelPricing::new(0.14, 0.28);
        assert!((no_discount.cache_read_cost(1000) - 0.14).abs() < EPS);
    }
}
