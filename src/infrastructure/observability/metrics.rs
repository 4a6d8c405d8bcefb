//! Prometheus metrics

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::MetricsConfig;
use crate::domain::provider::Provider;
use crate::domain::provider_key::KeyValidation;

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("uuid pattern is valid")
});

static NUMERIC_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\d+(/|$)").expect("numeric pattern is valid"));

const MAX_PATH_LABEL_LEN: usize = 50;

/// Handle used to render the `/metrics` endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the global Prometheus recorder; `None` when disabled or
/// when a recorder is already installed
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("ai_cost_guardian_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

pub fn record_key_validation(provider: Provider, validation: &KeyValidation) {
    let outcome = match (validation.is_valid, validation.warning.is_some()) {
        (true, false) => "valid",
        (true, true) => "valid_with_warning",
        (false, _) => "invalid",
    };
    let labels = [
        ("provider", provider.as_str().to_string()),
        ("outcome", outcome.to_string()),
    ];

    counter!("key_validations_total", &labels).increment(1);
}

pub fn record_use_case_search(result_count: usize) {
    let matched = if result_count > 0 { "true" } else { "false" };

    counter!("use_case_searches_total", "matched" => matched).increment(1);
    histogram!("use_case_search_results").record(result_count as f64);
}

/// Collapses ids in a request path so labels stay low-cardinality
fn sanitize_path(path: &str) -> String {
    let path = UUID_SEGMENT.replace_all(path, "{id}");
    let path = NUMERIC_SEGMENT.replace_all(&path, "/{id}$1");

    path.chars().take(MAX_PATH_LABEL_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_uuid() {
        let path = "/api/settings/api-keys/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(sanitize_path(path), "/api/settings/api-keys/{id}");
    }

    #[test]
    fn test_sanitize_path_numeric_id() {
        assert_eq!(sanitize_path("/api/use-cases/42/related"), "/api/use-cases/{id}/related");
    }

    #[test]
    fn test_sanitize_path_keeps_named_ids() {
        assert_eq!(sanitize_path("/api/use-cases/haiku-10"), "/api/use-cases/haiku-10");
    }

    #[test]
    fn test_sanitize_path_truncates_long_paths() {
        let path = "/api/use-cases/search/with/a/very/long/trailing/path/for/labels";
        assert_eq!(sanitize_path(path).chars().count(), MAX_PATH_LABEL_LEN);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_http_request("GET", "/health", 200, Duration::from_millis(3));
        record_key_validation(Provider::OpenAi, &KeyValidation::valid("gpt-4"));
        record_use_case_search(0);
    }
}
