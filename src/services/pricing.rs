//! Cost Calculator
//!
//! Per-model token pricing and cost computation. Costs are integer
//! microdollars (1 USD = 1,000,000 microdollars) to keep aggregates exact.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Pricing for one model: price per million tokens, in microdollars
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Model name (prefix match for versioned variants)
    pub model_name: String,
    /// Input token price per million tokens in microdollars
    pub input_price_per_million: i64,
    /// Output token price per million tokens in microdollars
    pub output_price_per_million: i64,
}

impl ModelPricing {
    /// Create a new pricing entry
    pub fn new(
        model_name: impl Into<String>,
        input_price_per_million: i64,
        output_price_per_million: i64,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            input_price_per_million,
            output_price_per_million,
        }
    }

    /// Cost in microdollars for the given token counts
    pub fn calculate_cost(&self, input_tokens: i64, output_tokens: i64) -> i64 {
        let input_cost = (input_tokens * self.input_price_per_million) / 1_000_000;
        let output_cost = (output_tokens * self.output_price_per_million) / 1_000_000;
        input_cost + output_cost
    }
}

/// Default pricing for the models the agents are configured with
fn default_pricing() -> Vec<ModelPricing> {
    vec![
        ModelPricing::new("claude-sonnet-4-5", 3_000_000, 15_000_000),
        ModelPricing::new("claude-sonnet-4", 3_000_000, 15_000_000),
        ModelPricing::new("claude-opus-4", 15_000_000, 75_000_000),
        ModelPricing::new("claude-haiku-4-5", 1_000_000, 5_000_000),
        ModelPricing::new("claude-3-5-haiku", 800_000, 4_000_000),
    ]
}

/// Fallback for unknown models: $3/M input, $15/M output
const FALLBACK_INPUT_PRICE: i64 = 3_000_000;
const FALLBACK_OUTPUT_PRICE: i64 = 15_000_000;

/// Cost calculator for computing API usage costs
#[derive(Debug)]
pub struct CostCalculator {
    pricing: HashMap<String, ModelPricing>,
}

impl Default for CostCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl CostCalculator {
    /// Create a new cost calculator with default pricing
    pub fn new() -> Self {
        let pricing = default_pricing()
            .into_iter()
            .map(|p| (p.model_name.clone(), p))
            .collect();
        Self { pricing }
    }

    /// Create a calculator with an explicit pricing table
    pub fn with_pricing(pricing_list: Vec<ModelPricing>) -> Self {
        let pricing = pricing_list
            .into_iter()
            .map(|p| (p.model_name.clone(), p))
            .collect();
        Self { pricing }
    }

    /// Get pricing for a model; versioned names match their base entry
    /// by prefix (longest prefix wins)
    pub fn get_pricing(&self, model_name: &str) -> Option<&ModelPricing> {
        if let Some(pricing) = self.pricing.get(model_name) {
            return Some(pricing);
        }
        self.pricing
            .values()
            .filter(|p| model_name.starts_with(&p.model_name))
            .max_by_key(|p| p.model_name.len())
    }

    /// Calculate cost in microdollars, falling back to the default estimate
    /// for unknown models
    pub fn calculate_cost(&self, model_name: &str, input_tokens: i64, output_tokens: i64) -> i64 {
        if let Some(pricing) = self.get_pricing(model_name) {
            pricing.calculate_cost(input_tokens, output_tokens)
        } else {
            let input_cost = (input_tokens * FALLBACK_INPUT_PRICE) / 1_000_000;
            let output_cost = (output_tokens * FALLBACK_OUTPUT_PRICE) / 1_000_000;
            input_cost + output_cost
        }
    }

    /// Format cost in dollars for display
    pub fn format_cost_dollars(microdollars: i64) -> String {
        let dollars = microdollars as f64 / 1_000_000.0;
        format!("${:.4}", dollars)
    }
}
