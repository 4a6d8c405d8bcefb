//! Checks provider secrets against each provider's HTTP API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::DomainError;
use crate::domain::provider::Provider;
use crate::domain::provider_key::{KeyValidation, KeyValidator, mask_secret};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const GROK_FORMAT_MIN_LEN: usize = 20;

/// Base URLs of the provider APIs, without trailing path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub openai: String,
    pub anthropic: String,
    pub gemini: String,
    pub xai: String,
    pub perplexity: String,
    pub cohere: String,
    pub mistral: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai: "https://api.openai.com".to_string(),
            anthropic: "https://api.anthropic.com".to_string(),
            gemini: "https://generativelanguage.googleapis.com".to_string(),
            xai: "https://api.x.ai".to_string(),
            perplexity: "https://api.perplexity.ai".to_string(),
            cohere: "https://api.cohere.ai".to_string(),
            mistral: "https://api.mistral.ai".to_string(),
        }
    }
}

impl ProviderEndpoints {
    /// Every provider served from one base URL
    pub fn all_at(base_url: &str) -> Self {
        let base = base_url.to_string();
        Self {
            openai: base.clone(),
            anthropic: base.clone(),
            gemini: base.clone(),
            xai: base.clone(),
            perplexity: base.clone(),
            cohere: base.clone(),
            mistral: base,
        }
    }

    fn url(base: &str, path: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), path)
    }
}

/// One request attempt: a status and body, or a transport failure
enum Probe {
    Response { status: StatusCode, body: String },
    Unreachable,
}

#[derive(Debug, Clone)]
pub struct HttpKeyValidator {
    client: reqwest::Client,
    endpoints: ProviderEndpoints,
}

impl HttpKeyValidator {
    pub fn new(endpoints: ProviderEndpoints, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoints })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Probe {
        match request.send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Probe::Response { status, body }
            }
            Err(e) => {
                debug!(error = %e, "Provider request failed");
                Probe::Unreachable
            }
        }
    }

    /// GET `{base}/v1/models` with a bearer token; shared by several providers
    async fn check_models_endpoint(
        &self,
        provider: Provider,
        base: &str,
        secret: &str,
        model: &str,
    ) -> KeyValidation {
        let request = self
            .client
            .get(ProviderEndpoints::url(base, "/v1/models"))
            .bearer_auth(secret);

        match self.send(request).await {
            Probe::Response { status, .. } if status.is_success() => KeyValidation::valid(model),
            Probe::Response { status, .. } if status == StatusCode::UNAUTHORIZED => {
                KeyValidation::invalid("Invalid API key")
            }
            Probe::Response { status, .. } => {
                KeyValidation::invalid(format!("API error: {}", status.as_u16()))
            }
            Probe::Unreachable => KeyValidation::invalid(format!(
                "Failed to connect to {}",
                provider.display_name()
            )),
        }
    }

    async fn validate_openai(&self, secret: &str) -> KeyValidation {
        let request = self
            .client
            .get(ProviderEndpoints::url(&self.endpoints.openai, "/v1/models"))
            .bearer_auth(secret);

        match self.send(request).await {
            Probe::Response { status, body } if status.is_success() => {
                let has_gpt4 = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|v| v.get("data").and_then(|d| d.as_array()).cloned())
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|m| m.get("id").and_then(|id| id.as_str()))
                    .any(|id| id.contains("gpt-4"));

                KeyValidation::valid(if has_gpt4 { "gpt-4" } else { "gpt-3.5-turbo" })
            }
            Probe::Response { status, .. } if status == StatusCode::UNAUTHORIZED => {
                KeyValidation::invalid("Invalid API key")
            }
            Probe::Response { status, .. } => {
                KeyValidation::invalid(format!("API error: {}", status.as_u16()))
            }
            Probe::Unreachable => KeyValidation::invalid("Failed to connect to OpenAI"),
        }
    }

    async fn validate_claude(&self, secret: &str) -> KeyValidation {
        if !secret.starts_with("sk-ant-") {
            return KeyValidation::invalid("Invalid Claude API key format");
        }

        let request = self
            .client
            .post(ProviderEndpoints::url(&self.endpoints.anthropic, "/v1/messages"))
            .header("x-api-key", secret)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": "claude-3-haiku-20240307",
                "messages": [{ "role": "user", "content": "Hi" }],
                "max_tokens": 1
            }));

        match self.send(request).await {
            Probe::Response { status, .. } if status == StatusCode::UNAUTHORIZED => {
                KeyValidation::invalid("Invalid API key")
            }
            Probe::Response { status, .. } if status == StatusCode::FORBIDDEN => {
                KeyValidation::invalid("API key lacks required permissions")
            }
            Probe::Response { status, .. }
                if status.is_success() || status == StatusCode::TOO_MANY_REQUESTS =>
            {
                KeyValidation::valid("claude-3")
            }
            Probe::Response { status, body } => {
                let message = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|v| {
                        v.pointer("/error/message")
                            .and_then(|m| m.as_str())
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| format!("API error: {}", status.as_u16()));

                if message.contains("credit") || message.contains("billing") {
                    KeyValidation::valid_with_warning(
                        "claude-3",
                        "Key is valid but has billing/credit issues",
                    )
                } else {
                    KeyValidation::invalid(message)
                }
            }
            Probe::Unreachable => KeyValidation::invalid("Failed to connect to Anthropic"),
        }
    }

    async fn validate_gemini(&self, secret: &str) -> KeyValidation {
        let request = self
            .client
            .get(ProviderEndpoints::url(&self.endpoints.gemini, "/v1/models"))
            .query(&[("key", secret)]);

        match self.send(request).await {
            Probe::Response { status, .. } if status.is_success() => {
                KeyValidation::valid("gemini-pro")
            }
            Probe::Response { status, .. }
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                KeyValidation::invalid("Invalid API key")
            }
            Probe::Response { status, .. } => {
                KeyValidation::invalid(format!("API error: {}", status.as_u16()))
            }
            Probe::Unreachable => KeyValidation::invalid("Failed to connect to Google AI"),
        }
    }

    async fn validate_grok(&self, secret: &str) -> KeyValidation {
        if !secret.starts_with("xai-") {
            return KeyValidation::invalid("Invalid Grok API key format (should start with xai-)");
        }

        let unreachable = || {
            if secret.len() > GROK_FORMAT_MIN_LEN {
                warn!(key = %mask_secret(secret), "xAI unreachable, accepting key on format");
                KeyValidation::valid_with_warning(
                    "grok-beta",
                    "Could not validate with API, accepted based on format",
                )
            } else {
                KeyValidation::invalid("Failed to connect to xAI")
            }
        };

        let models = self
            .client
            .get(ProviderEndpoints::url(&self.endpoints.xai, "/v1/models"))
            .bearer_auth(secret);

        match self.send(models).await {
            Probe::Response { status, .. } if status.is_success() => {
                return KeyValidation::valid("grok-beta");
            }
            Probe::Response { .. } => {}
            Probe::Unreachable => return unreachable(),
        }

        let chat = self
            .client
            .post(ProviderEndpoints::url(&self.endpoints.xai, "/v1/chat/completions"))
            .bearer_auth(secret)
            .json(&json!({
                "model": "grok-beta",
                "messages": [{ "role": "user", "content": "Hi" }],
                "max_tokens": 1,
                "temperature": 0
            }));

        match self.send(chat).await {
            Probe::Response { status, .. }
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                KeyValidation::invalid("Invalid or unauthorized API key")
            }
            Probe::Response { status, .. }
                if status.is_success()
                    || matches!(
                        status,
                        StatusCode::BAD_REQUEST
                            | StatusCode::NOT_FOUND
                            | StatusCode::TOO_MANY_REQUESTS
                    ) =>
            {
                KeyValidation::valid("grok-beta")
            }
            Probe::Response { status, .. } => {
                KeyValidation::invalid(format!("API error: {}", status.as_u16()))
            }
            Probe::Unreachable => unreachable(),
        }
    }

    async fn validate_perplexity(&self, secret: &str) -> KeyValidation {
        let request = self
            .client
            .post(ProviderEndpoints::url(&self.endpoints.perplexity, "/chat/completions"))
            .bearer_auth(secret)
            .json(&json!({
                "model": "llama-3.1-sonar-small-128k-online",
                "messages": [{ "role": "user", "content": "Hi" }],
                "max_tokens": 1
            }));

        match self.send(request).await {
            Probe::Response { status, .. }
                if status.is_success() || status == StatusCode::BAD_REQUEST =>
            {
                KeyValidation::valid("llama-3.1-sonar")
            }
            Probe::Response { status, .. } if status == StatusCode::UNAUTHORIZED => {
                KeyValidation::invalid("Invalid API key")
            }
            Probe::Response { status, .. } => {
                KeyValidation::invalid(format!("API error: {}", status.as_u16()))
            }
            Probe::Unreachable => KeyValidation::invalid("Failed to connect to Perplexity"),
        }
    }
}

#[async_trait]
impl KeyValidator for HttpKeyValidator {
    async fn validate(&self, provider: Provider, secret: &str) -> KeyValidation {
        let secret = secret.trim();
        debug!(provider = %provider, key = %mask_secret(secret), "Validating provider key");

        match provider {
            Provider::OpenAi => self.validate_openai(secret).await,
            Provider::Claude => self.validate_claude(secret).await,
            Provider::Gemini => self.validate_gemini(secret).await,
            Provider::Grok => self.validate_grok(secret).await,
            Provider::Perplexity => self.validate_perplexity(secret).await,
            Provider::Cohere => {
                self.check_models_endpoint(provider, &self.endpoints.cohere, secret, "command")
                    .await
            }
            Provider::Mistral => {
                self.check_models_endpoint(provider, &self.endpoints.mistral, secret, "mistral-large")
                    .await
            }
        }
    }
}
