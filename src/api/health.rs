//! Liveness and readiness probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::Serialize;

use crate::api::types::Json;

use super::state::AppState;

const READY_PROBE_ORGANIZATION: &str = "__readiness_probe__";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl HealthCheck {
    fn healthy(name: &str, started: Instant) -> Self {
        Self {
            name: name.to_string(),
            status: HealthStatus::Healthy,
            message: None,
            latency_ms: Some(started.elapsed().as_millis() as u64),
        }
    }

    fn failed(name: &str, status: HealthStatus, message: String, started: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: Some(message),
            latency_ms: Some(started.elapsed().as_millis() as u64),
        }
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// GET /ready: storage must answer and the embedded catalogs must be loaded
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let checks = vec![check_storage(&state).await, check_catalogs(&state)];

    let overall_status = checks
        .iter()
        .map(|c| c.status)
        .fold(HealthStatus::Healthy, worst);

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(checks),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match overall_status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (status_code, Json(response))
}

/// GET /live
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

fn worst(a: HealthStatus, b: HealthStatus) -> HealthStatus {
    match (a, b) {
        (HealthStatus::Unhealthy, _) | (_, HealthStatus::Unhealthy) => HealthStatus::Unhealthy,
        (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded) => HealthStatus::Degraded,
        _ => HealthStatus::Healthy,
    }
}

async fn check_storage(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    match state
        .team_service
        .get(READY_PROBE_ORGANIZATION, Utc::now())
        .await
    {
        Ok(_) => HealthCheck::healthy("storage", start),
        Err(e) => HealthCheck::failed("storage", HealthStatus::Unhealthy, e.to_string(), start),
    }
}

fn check_catalogs(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    if state.use_cases.is_empty() || state.providers.providers().is_empty() {
        HealthCheck::failed(
            "catalogs",
            HealthStatus::Degraded,
            "embedded catalog is empty".to_string(),
            start,
        )
    } else {
        HealthCheck::healthy("catalogs", start)
    }
}
