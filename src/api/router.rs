use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use super::endpoints;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use crate::infrastructure::observability::{PrometheusMetrics, create_metrics_router};

/// Probes and the JSON API; `metrics` adds the Prometheus endpoint at `metrics_path`
pub fn create_router_with_state(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    metrics_path: &str,
) -> Router {
    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api", endpoints::create_api_router())
        .with_state(state);

    let router = match metrics {
        Some(metrics) => router
            .merge(create_metrics_router(metrics, metrics_path))
            .layer(middleware::from_fn(metrics_middleware)),
        None => router,
    };

    router
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::api::middleware::user_auth::{ORGANIZATION_ID_HEADER, USER_ID_HEADER};
    use crate::domain::provider_key::KeyCipher;
    use crate::domain::provider_key::mock::MockKeyValidator;
    use crate::infrastructure::storage::StorageFactory;

    async fn app() -> Router {
        let validator = Arc::new(MockKeyValidator::new().rejecting("sk-bad"));
        let cipher = KeyCipher::new("router-test-secret").unwrap();
        let state = crate::build_app_state(
            &StorageFactory::in_memory(),
            validator,
            cipher,
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        create_router_with_state(state, None, "/metrics")
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(USER_ID_HEADER, "user-1")
            .header(ORGANIZATION_ID_HEADER, "org-1");

        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health_probes() {
        let app = app().await;

        let (status, body) = send(&app, request("GET", "/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(&app, request("GET", "/ready", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"].as_array().unwrap().len(), 2);

        let (status, _) = send(&app, request("GET", "/live", None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_use_case_search_returns_scored_results() {
        let app = app().await;

        let (status, body) =
            send(&app, request("GET", "/api/use-cases/search?q=regex&limit=2", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "regex");
        let results = body["results"].as_array().unwrap();
        assert!(!results.is_empty());
        assert!(results.len() <= 2);
    }

    #[tokio::test]
    async fn test_model_recommendation() {
        let app = app().await;

        let (status, body) = send(
            &app,
            request("GET", "/api/use-cases/recommend?q=Regex%20to%20match%20email", None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], "claude-3-haiku-20240307");
        assert_eq!(body["confidence"], 0.15);
        assert_eq!(body["use_cases"][0]["id"], "haiku-10");
        assert_eq!(body["estimated_cost"], 0.00007);

        let (_, body) = send(&app, request("GET", "/api/use-cases/recommend", None)).await;
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["confidence"], 0.0);
        assert!(body["estimated_cost"].is_null());
    }

    #[tokio::test]
    async fn test_use_case_stats() {
        let app = app().await;

        let (status, body) = send(&app, request("GET", "/api/use-cases/stats", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 60);
        assert_eq!(body["models"][0]["model"], "gpt-4o-mini");
        assert_eq!(body["models"][1]["total"], 30);
    }

    #[tokio::test]
    async fn test_unknown_use_case_is_404() {
        let app = app().await;

        let (status, body) = send(&app, request("GET", "/api/use-cases/nope", None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found_error");
    }

    #[tokio::test]
    async fn test_model_explorer_filters_by_provider() {
        let app = app().await;

        let (status, body) = send(&app, request("GET", "/api/models?provider=claude", None)).await;

        assert_eq!(status, StatusCode::OK);
        let models = body["models"].as_array().unwrap();
        assert!(!models.is_empty());
        assert!(models.iter().all(|m| m["provider_id"] == "claude"));
    }

    #[tokio::test]
    async fn test_keys_require_identity() {
        let app = app().await;
        let request = Request::builder()
            .uri("/api/settings/api-keys")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["type"], "authentication_error");
    }

    #[tokio::test]
    async fn test_key_lifecycle() {
        let app = app().await;

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/settings/api-keys",
                Some(json!({"provider": "openai", "apiKey": "sk-good-key-123456"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["validation"]["is_valid"], true);
        let key_id = body["key"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, request("GET", "/api/settings/api-keys", None)).await;
        assert_eq!(status, StatusCode::OK);
        let keys = body["keys"].as_array().unwrap();
        assert_eq!(keys.len(), 1);
        assert!(!keys[0].to_string().contains("sk-good-key-123456"));

        let (status, body) = send(
            &app,
            request("PATCH", "/api/settings/api-keys", Some(json!({"provider": "openai"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_valid"], true);

        let (status, body) = send(
            &app,
            request("POST", "/api/api-keys/validate", Some(json!({"keyId": key_id}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_valid"], true);

        let (status, _) = send(
            &app,
            request("DELETE", &format!("/api/settings/api-keys?id={}", key_id), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, request("GET", "/api/settings/api-keys", None)).await;
        assert!(body["keys"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_key_is_400() {
        let app = app().await;

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/api/settings/api-keys",
                Some(json!({"provider": "openai", "api_key": "sk-bad"})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_400_with_param() {
        let app = app().await;

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/settings/api-keys",
                Some(json!({"provider": "watson", "api_key": "k"})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["param"], "provider");
    }

    #[tokio::test]
    async fn test_delete_without_selector_is_400() {
        let app = app().await;

        let (status, body) = send(&app, request("DELETE", "/api/settings/api-keys", None)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Key ID or provider is required");
    }

    #[tokio::test]
    async fn test_validate_without_key_id_is_400() {
        let app = app().await;

        let (status, body) =
            send(&app, request("POST", "/api/api-keys/validate", Some(json!({})))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Key ID required");
    }

    #[tokio::test]
    async fn test_admin_key_check() {
        let app = app().await;
        let admin_key = format!("sk-ant-admin01-{}", "a".repeat(40));

        let (status, body) = send(
            &app,
            request("POST", "/api/claude-admin/test", Some(json!({"testApiKey": admin_key}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_admin"], true);

        let (status, _) =
            send(&app, request("POST", "/api/claude-admin/test", Some(json!({})))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let app = app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/usage")
            .header(USER_ID_HEADER, "user-1")
            .header(ORGANIZATION_ID_HEADER, "org-1")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_usage_feeds_dashboard() {
        let app = app().await;

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/api/usage",
                Some(json!({
                    "provider": "OpenAI",
                    "model": "gpt-4o",
                    "prompt_tokens": 100,
                    "completion_tokens": 50,
                    "cost": 1.5
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, request("GET", "/api/usage?days=7", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["total_requests"], 1);
        assert_eq!(body["summary"]["by_provider"]["openai"]["tokens"], 150);

        let (status, body) =
            send(&app, request("GET", "/api/dashboard/metrics?timeframe=7d", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["executive_metrics"]["total_requests"], 1);
        assert_eq!(body["executive_metrics"]["total_spend"], 1.5);
    }

    #[tokio::test]
    async fn test_budgets_and_alerts() {
        let app = app().await;

        let (status, body) =
            send(&app, request("POST", "/api/budgets", Some(json!({"amount": 500.0})))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["period"], "monthly");

        let (_, body) = send(&app, request("GET", "/api/budgets", None)).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/api/alerts",
                Some(json!({"type": "budget", "message": "80% of budget used", "threshold": 80.0})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = send(&app, request("GET", "/api/alerts", None)).await;
        assert_eq!(body[0]["message"], "80% of budget used");
    }

    #[tokio::test]
    async fn test_team_stats_lifecycle() {
        let app = app().await;

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/team/stats",
                Some(json!({"user_id": "user-2", "requests": 3, "tokens": 900, "spend": 2.0})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["members"].as_array().unwrap().len(), 1);

        let (_, body) = send(&app, request("GET", "/api/team/stats", None)).await;
        assert_eq!(body["members"][0]["user_id"], "user-2");

        let (status, body) = send(&app, request("DELETE", "/api/team/stats", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reset"], true);

        let (_, body) = send(&app, request("GET", "/api/team/stats", None)).await;
        assert!(body["members"].as_array().unwrap().is_empty());
    }
}
