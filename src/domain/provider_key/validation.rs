//! Provider key validation outcomes

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::provider::Provider;

/// Capabilities granted by an Anthropic organization admin key
pub const ADMIN_CAPABILITIES: [&str; 8] = [
    "organization_management",
    "user_management",
    "api_key_management",
    "billing_access",
    "usage_analytics",
    "model_management",
    "rate_limit_control",
    "audit_logs",
];

/// Result of checking a secret against its provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValidation {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl KeyValidation {
    pub fn valid(model: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            error: None,
            warning: None,
            model: Some(model.into()),
        }
    }

    /// Accepted, but something about the account needs attention
    pub fn valid_with_warning(model: impl Into<String>, warning: impl Into<String>) -> Self {
        Self {
            warning: Some(warning.into()),
            ..Self::valid(model)
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
            warning: None,
            model: None,
        }
    }
}

/// Outcome of an admin key check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminKeyCheck {
    pub is_admin: bool,
    pub key_type: &'static str,
    pub capabilities: Vec<&'static str>,
}

impl AdminKeyCheck {
    pub fn anthropic_admin() -> Self {
        Self {
            is_admin: true,
            key_type: "Claude Admin",
            capabilities: ADMIN_CAPABILITIES.to_vec(),
        }
    }
}

/// Checks a secret against the provider's API.
///
/// Implementations never fail: transport problems are reported as an
/// invalid [`KeyValidation`].
#[async_trait]
pub trait KeyValidator: Send + Sync + std::fmt::Debug {
    async fn validate(&self, provider: Provider, secret: &str) -> KeyValidation;
}
