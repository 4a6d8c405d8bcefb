//! Usage logs, budgets, alerts and the dashboard

use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::usage::{Alert, Budget, DashboardMetrics, Timeframe, UsageLog};
use crate::infrastructure::usage::{
    CreateAlertRequest, CreateBudgetRequest, RecordUsageRequest, UsageFilter, UsageReport,
};

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    #[serde(default)]
    pub timeframe: Option<String>,
}

/// GET /api/dashboard/metrics
pub async fn dashboard_metrics(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardMetrics>, ApiError> {
    let timeframe = params
        .timeframe
        .as_deref()
        .map(Timeframe::from_param)
        .unwrap_or_default();

    let total_users = state
        .team_service
        .member_count(&owner.organization_id)
        .await?;

    let metrics = state
        .usage_service
        .dashboard(&owner, timeframe, total_users, Utc::now())
        .await?;

    Ok(Json(metrics))
}

#[derive(Debug, Deserialize)]
pub struct UsageParams {
    #[serde(default)]
    pub days: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

impl UsageParams {
    /// Non-numeric values are ignored rather than rejected
    fn into_filter(self) -> UsageFilter {
        UsageFilter {
            days: self.days.and_then(|d| d.trim().parse().ok()),
            provider: self
                .provider
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty() && p != "all"),
            limit: self.limit.and_then(|l| l.trim().parse().ok()),
        }
    }
}

/// GET /api/usage
pub async fn list_usage(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Query(params): Query<UsageParams>,
) -> Result<Json<UsageReport>, ApiError> {
    let report = state
        .usage_service
        .list(&owner, params.into_filter(), Utc::now())
        .await?;

    Ok(Json(report))
}

/// POST /api/usage
pub async fn record_usage(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Json(request): Json<RecordUsageRequest>,
) -> Result<(StatusCode, Json<UsageLog>), ApiError> {
    let log = state.usage_service.record(&owner, request).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[derive(Debug, Deserialize)]
pub struct BudgetParams {
    #[serde(default, alias = "activeOnly")]
    pub active_only: Option<String>,
}

impl BudgetParams {
    /// Only an explicit `false` lists inactive budgets too
    fn active_only(&self) -> bool {
        !matches!(
            self.active_only.as_deref().map(str::trim),
            Some("false") | Some("0")
        )
    }
}

/// GET /api/budgets
pub async fn list_budgets(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Query(params): Query<BudgetParams>,
) -> Result<Json<Vec<Budget>>, ApiError> {
    let budgets = state
        .usage_service
        .list_budgets(&owner, params.active_only())
        .await?;

    Ok(Json(budgets))
}

/// POST /api/budgets
pub async fn create_budget(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Json(request): Json<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<Budget>), ApiError> {
    let budget = state.usage_service.create_budget(&owner, request).await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

/// GET /api/alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
) -> Result<Json<Vec<Alert>>, ApiError> {
    let alerts = state.usage_service.list_alerts(&owner).await?;
    Ok(Json(alerts))
}

/// POST /api/alerts
pub async fn create_alert(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Json(request): Json<CreateAlertRequest>,
) -> Result<(StatusCode, Json<Alert>), ApiError> {
    let alert = state.usage_service.create_alert(&owner, request).await?;
    Ok((StatusCode::CREATED, Json(alert)))
}
