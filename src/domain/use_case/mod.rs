//! Use-case catalog: hand-authored prompt categories mapped to recommended models

mod catalog;
mod entity;
mod matcher;
mod recommend;

pub use catalog::{UseCaseCatalog, EMBEDDED_USE_CASES};
pub use entity::{Complexity, DetailedUseCase, EstimatedTokens, ModelUseCases, RecommendedModels};
pub use matcher::{DEFAULT_LIMIT, ScoredUseCase, find_best_use_cases, score_use_case};
pub use recommend::{DEFAULT_MODEL, ModelRecommendation, ModelUseCaseStats};
