//! Per-organization team usage statistics

use axum::extract::State;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::team::{MemberUsage, TeamStats};

/// GET /api/team/stats
pub async fn get_team_stats(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
) -> Result<Json<TeamStats>, ApiError> {
    let stats = state
        .team_service
        .get(&owner.organization_id, Utc::now())
        .await?;

    Ok(Json(stats))
}

/// POST /api/team/stats: add usage to one member's totals
pub async fn record_team_usage(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Json(usage): Json<MemberUsage>,
) -> Result<Json<TeamStats>, ApiError> {
    let stats = state
        .team_service
        .record(&owner.organization_id, usage, Utc::now())
        .await?;

    Ok(Json(stats))
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub reset: bool,
}

/// DELETE /api/team/stats
pub async fn reset_team_stats(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
) -> Result<Json<ResetResponse>, ApiError> {
    let reset = state.team_service.reset(&owner.organization_id).await?;
    info!(organization_id = %owner.organization_id, reset, "Team stats reset");

    Ok(Json(ResetResponse {
        success: true,
        reset,
    }))
}
