//! Provider key management: store, list, delete and test keys

use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::provider::Provider;
use crate::domain::provider_key::{
    AdminKeyCheck, KeyValidation, ProviderKeyId, ProviderKeySummary,
};

/// Parses a provider name, reporting the offending field on failure
pub(crate) fn parse_provider(raw: &str) -> Result<Provider, ApiError> {
    raw.parse::<Provider>()
        .map_err(|e| ApiError::from(e).with_param("provider"))
}

#[derive(Debug, Serialize)]
pub struct ListKeysResponse {
    pub success: bool,
    pub keys: Vec<ProviderKeySummary>,
}

/// GET /api/settings/api-keys
pub async fn list_keys(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
) -> Result<Json<ListKeysResponse>, ApiError> {
    let keys = state.provider_key_service.list(&owner).await?;

    Ok(Json(ListKeysResponse {
        success: true,
        keys,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SaveKeyRequest {
    pub provider: String,
    #[serde(alias = "apiKey")]
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct SaveKeyResponse {
    pub success: bool,
    pub message: String,
    pub key: ProviderKeySummary,
    pub validation: KeyValidation,
}

/// POST /api/settings/api-keys
pub async fn save_key(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Json(request): Json<SaveKeyRequest>,
) -> Result<(StatusCode, Json<SaveKeyResponse>), ApiError> {
    let provider = parse_provider(&request.provider)?;
    let saved = state
        .provider_key_service
        .save(&owner, provider, &request.api_key)
        .await?;

    info!(
        user_id = %owner.user_id,
        provider = %provider,
        key_id = %saved.key.id,
        "Provider key saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(SaveKeyResponse {
            success: true,
            message: format!("{} API key saved successfully", provider.display_name()),
            key: saved.key,
            validation: saved.validation,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct DeleteKeyParams {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// DELETE /api/settings/api-keys?id= or ?provider=
///
/// The id wins when both are given.
pub async fn delete_key(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Query(params): Query<DeleteKeyParams>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = params.id.filter(|id| !id.trim().is_empty());
    let provider = params.provider.filter(|p| !p.trim().is_empty());

    match (id, provider) {
        (Some(id), _) => {
            state
                .provider_key_service
                .delete_by_id(&owner, &ProviderKeyId::new(id.trim()))
                .await?
        }
        (None, Some(provider)) => {
            let provider = parse_provider(&provider)?;
            state
                .provider_key_service
                .delete_by_provider(&owner, provider)
                .await?
        }
        (None, None) => {
            return Err(ApiError::bad_request("Key ID or provider is required"));
        }
    }

    Ok(Json(MessageResponse {
        success: true,
        message: "API key deleted successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct TestKeyRequest {
    pub provider: String,
}

#[derive(Debug, Serialize)]
pub struct TestKeyResponse {
    pub provider: Provider,
    #[serde(flatten)]
    pub validation: KeyValidation,
}

/// PATCH /api/settings/api-keys: re-test the stored key for one provider
pub async fn test_key(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Json(request): Json<TestKeyRequest>,
) -> Result<Json<TestKeyResponse>, ApiError> {
    let provider = parse_provider(&request.provider)?;
    let validation = state.provider_key_service.test(&owner, provider).await?;

    Ok(Json(TestKeyResponse {
        provider,
        validation,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateKeyRequest {
    #[serde(default, alias = "keyId")]
    pub key_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateKeyResponse {
    pub key_id: ProviderKeyId,
    #[serde(flatten)]
    pub validation: KeyValidation,
}

/// POST /api/api-keys/validate: re-test a stored key by id
pub async fn validate_key(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Json(request): Json<ValidateKeyRequest>,
) -> Result<Json<ValidateKeyResponse>, ApiError> {
    let key_id = request
        .key_id
        .filter(|id| !id.trim().is_empty())
        .map(|id| ProviderKeyId::new(id.trim()))
        .ok_or_else(|| ApiError::bad_request("Key ID required").with_param("key_id"))?;

    let validation = state
        .provider_key_service
        .test_by_id(&owner, &key_id)
        .await?;

    Ok(Json(ValidateKeyResponse { key_id, validation }))
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminTestRequest {
    #[serde(default, alias = "testApiKey")]
    pub test_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminTestResponse {
    pub success: bool,
    #[serde(flatten)]
    pub check: AdminKeyCheck,
}

/// POST /api/claude-admin/test
///
/// Checks the supplied key, or the caller's stored Claude key when none is given.
pub async fn test_admin_key(
    State(state): State<AppState>,
    RequireUser(owner): RequireUser,
    Json(request): Json<AdminTestRequest>,
) -> Result<Json<AdminTestResponse>, ApiError> {
    let supplied = request
        .test_api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());

    let check = state
        .provider_key_service
        .test_admin(&owner, supplied)
        .await?;

    Ok(Json(AdminTestResponse {
        success: true,
        check,
    }))
}
