//! Model recommendation for a prompt and per-model catalog statistics

use std::collections::BTreeSet;

use serde::Serialize;

use super::catalog::UseCaseCatalog;
use super::entity::{DetailedUseCase, EstimatedTokens};
use super::matcher::ScoredUseCase;
use crate::domain::provider::ProviderCatalog;

/// Recommended when no use case matches
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const EXAMPLE_WEIGHT: u32 = 10;
const CATEGORY_WEIGHT: u32 = 5;
const TITLE_WEIGHT: u32 = 7;

/// Score at which confidence reaches 1.0
const FULL_CONFIDENCE_SCORE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRecommendation<'a> {
    pub model: &'a str,
    /// Summed score of every matched use case of `model`
    pub score: u32,
    pub confidence: f64,
    /// Matched use cases, strongest first
    pub use_cases: Vec<ScoredUseCase<'a>>,
    /// Token estimate of the strongest match
    pub estimated_tokens: Option<EstimatedTokens>,
    /// USD per request at the model's listed price
    pub estimated_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelUseCaseStats<'a> {
    pub model: &'a str,
    pub total: usize,
    /// Distinct categories, sorted
    pub categories: Vec<&'a str>,
}

/// Scores a use case against an already lower-cased prompt. Unlike search,
/// categories and titles only count when the prompt contains them.
fn prompt_score(use_case: &DetailedUseCase, prompt: &str) -> u32 {
    let mut score = 0;

    let example_hit = use_case.examples.iter().any(|example| {
        let example = example.to_lowercase();
        prompt.contains(&example) || example.contains(prompt)
    });
    if example_hit {
        score += EXAMPLE_WEIGHT;
    }
    if prompt.contains(&use_case.category.to_lowercase()) {
        score += CATEGORY_WEIGHT;
    }
    if prompt.contains(&use_case.title.to_lowercase()) {
        score += TITLE_WEIGHT;
    }

    score
}

impl UseCaseCatalog {
    /// The model whose use cases match `prompt` best. Ties go to the model
    /// listed first; a blank or unmatched prompt yields [`DEFAULT_MODEL`].
    pub fn recommend(&self, prompt: &str, pricing: &ProviderCatalog) -> ModelRecommendation<'_> {
        let prompt = prompt.trim().to_lowercase();

        let mut best: Option<(&str, u32, Vec<ScoredUseCase<'_>>)> = None;
        if !prompt.is_empty() {
            for model in self.models() {
                let matches: Vec<ScoredUseCase<'_>> = self
                    .for_model(model)
                    .iter()
                    .filter_map(|use_case| {
                        let score = prompt_score(use_case, &prompt);
                        (score > 0).then_some(ScoredUseCase { score, use_case })
                    })
                    .collect();
                let total: u32 = matches.iter().map(|m| m.score).sum();

                if total > best.as_ref().map_or(0, |(_, score, _)| *score) {
                    best = Some((model, total, matches));
                }
            }
        }

        let Some((model, score, mut use_cases)) = best else {
            return ModelRecommendation {
                model: DEFAULT_MODEL,
                score: 0,
                confidence: 0.0,
                use_cases: Vec::new(),
                estimated_tokens: None,
                estimated_cost: None,
            };
        };

        // sort_by is stable
        use_cases.sort_by(|a, b| b.score.cmp(&a.score));
        let estimated_tokens = use_cases.first().map(|m| m.use_case.estimated_tokens);
        let estimated_cost = estimated_tokens
            .zip(pricing.find_model(model))
            .map(|(tokens, priced)| tokens.cost(priced.input_price, priced.output_price));

        ModelRecommendation {
            model,
            score,
            confidence: (f64::from(score) / FULL_CONFIDENCE_SCORE).min(1.0),
            use_cases,
            estimated_tokens,
            estimated_cost,
        }
    }

    /// Use-case totals and categories per model, in catalog order
    pub fn stats(&self) -> Vec<ModelUseCaseStats<'_>> {
        self.models()
            .map(|model| {
                let use_cases = self.for_model(model);
                let categories: BTreeSet<&str> =
                    use_cases.iter().map(|u| u.category.as_str()).collect();

                ModelUseCaseStats {
                    model,
                    total: use_cases.len(),
                    categories: categories.into_iter().collect(),
                }
            })
            .collect()
    }
}
