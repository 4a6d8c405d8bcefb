//! Use-case entities

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
    Expert,
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Moderate => write!(f, "moderate"),
            Self::Complex => write!(f, "complex"),
            Self::Expert => write!(f, "expert"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedModels {
    pub primary: String,
    pub alternatives: Vec<String>,
}

/// Typical token usage of one request in this category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatedTokens {
    pub prompt: u32,
    pub completion: u32,
}

impl EstimatedTokens {
    pub fn total(&self) -> u32 {
        self.prompt + self.completion
    }

    /// Cost in USD given per-1M-token prices
    pub fn cost(&self, input_price: f64, output_price: f64) -> f64 {
        (self.prompt as f64 * input_price + self.completion as f64 * output_price) / 1_000_000.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedUseCase {
    pub id: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub examples: Vec<String>,
    pub recommended_models: RecommendedModels,
    pub estimated_tokens: EstimatedTokens,
    pub complexity: Complexity,
    pub tags: Vec<String>,
}

/// All use cases authored for one model, in catalog order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelUseCases {
    pub model: String,
    pub use_cases: Vec<DetailedUseCase>,
}
