//! Read-only catalog endpoints: use cases, models and providers

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::provider::{AiProvider, ModelListing, ModelQuery};
use crate::domain::use_case::{
    DEFAULT_LIMIT, DetailedUseCase, ModelRecommendation, ModelUseCaseStats, ScoredUseCase,
};
use crate::infrastructure::observability::record_use_case_search;

const MAX_SEARCH_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<ScoredUseCase<'static>>,
    pub total: usize,
}

/// Unparseable or zero limits fall back to the default
fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|l| l.trim().parse::<usize>().ok())
        .filter(|l| *l > 0)
        .map_or(DEFAULT_LIMIT, |l| l.min(MAX_SEARCH_LIMIT))
}

/// GET /api/use-cases/search
pub async fn search_use_cases(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let query = params.q.unwrap_or_default();
    let limit = parse_limit(params.limit.as_deref());

    let results = state.use_cases.search(&query, limit);
    record_use_case_search(results.len());
    debug!(query = %query, limit, matches = results.len(), "Use case search");

    Json(SearchResponse {
        total: results.len(),
        query,
        results,
    })
}

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// GET /api/use-cases/recommend
pub async fn recommend_model(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> Json<ModelRecommendation<'static>> {
    let prompt = params.q.unwrap_or_default();
    let recommendation = state.use_cases.recommend(&prompt, state.providers);
    debug!(
        model = recommendation.model,
        score = recommendation.score,
        "Model recommendation"
    );

    Json(recommendation)
}

#[derive(Debug, Serialize)]
pub struct UseCaseStatsResponse {
    pub models: Vec<ModelUseCaseStats<'static>>,
    pub total: usize,
}

/// GET /api/use-cases/stats
pub async fn use_case_stats(State(state): State<AppState>) -> Json<UseCaseStatsResponse> {
    Json(UseCaseStatsResponse {
        models: state.use_cases.stats(),
        total: state.use_cases.len(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ListUseCasesParams {
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UseCasesResponse {
    pub use_cases: Vec<&'static DetailedUseCase>,
    pub total: usize,
}

/// GET /api/use-cases
pub async fn list_use_cases(
    State(state): State<AppState>,
    Query(params): Query<ListUseCasesParams>,
) -> Json<UseCasesResponse> {
    let use_cases: Vec<&'static DetailedUseCase> = match params.model.as_deref() {
        Some(model) if !model.trim().is_empty() => {
            state.use_cases.for_model(model.trim()).iter().collect()
        }
        _ => state.use_cases.all(),
    };

    Json(UseCasesResponse {
        total: use_cases.len(),
        use_cases,
    })
}

/// GET /api/use-cases/{id}
pub async fn get_use_case(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<&'static DetailedUseCase>, ApiError> {
    state
        .use_cases
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Use case '{}' not found", id)))
}

#[derive(Debug, Deserialize)]
pub struct ModelParams {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelListing>,
    pub total: usize,
    pub pricing_last_updated: &'static str,
}

/// GET /api/models
pub async fn list_models(
    State(state): State<AppState>,
    Query(params): Query<ModelParams>,
) -> Json<ModelsResponse> {
    let query = ModelQuery::from_params(
        params.provider.as_deref(),
        params.search.as_deref(),
        params.price.as_deref(),
        params.sort.as_deref(),
    );
    let models = state.providers.explore(&query);

    Json(ModelsResponse {
        total: models.len(),
        models,
        pricing_last_updated: state.providers.pricing_last_updated(),
    })
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: &'static [AiProvider],
    pub pricing_last_updated: &'static str,
}

/// GET /api/providers
pub async fn list_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        providers: state.providers.providers(),
        pricing_last_updated: state.providers.pricing_last_updated(),
    })
}
