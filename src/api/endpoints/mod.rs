//! JSON API routes

mod catalog;
mod keys;
mod team;
mod usage;

use axum::Router;
use axum::routing::{get, post};

use crate::api::state::AppState;

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/use-cases", get(catalog::list_use_cases))
        .route("/use-cases/search", get(catalog::search_use_cases))
        .route("/use-cases/recommend", get(catalog::recommend_model))
        .route("/use-cases/stats", get(catalog::use_case_stats))
        .route("/use-cases/{id}", get(catalog::get_use_case))
        .route("/models", get(catalog::list_models))
        .route("/providers", get(catalog::list_providers))
        .route(
            "/settings/api-keys",
            get(keys::list_keys)
                .post(keys::save_key)
                .delete(keys::delete_key)
                .patch(keys::test_key),
        )
        .route("/api-keys/validate", post(keys::validate_key))
        .route("/claude-admin/test", post(keys::test_admin_key))
        .route("/dashboard/metrics", get(usage::dashboard_metrics))
        .route("/usage", get(usage::list_usage).post(usage::record_usage))
        .route(
            "/budgets",
            get(usage::list_budgets).post(usage::create_budget),
        )
        .route("/alerts", get(usage::list_alerts).post(usage::create_alert))
        .route(
            "/team/stats",
            get(team::get_team_stats)
                .post(team::record_team_usage)
                .delete(team::reset_team_stats),
        )
}
