//! Provider key entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::identity::Identity;
use crate::domain::provider::Provider;
use crate::domain::storage::{StorageEntity, StorageKey};

/// What list responses show in place of a stored secret
pub const MASKED_KEY: &str = "••••••••••••••••";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderKeyId(String);

impl ProviderKeyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(format!("pk-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProviderKeyId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ProviderKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl StorageKey for ProviderKeyId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// An encrypted provider secret owned by one user in one organization.
///
/// At most one key exists per owner and provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderKey {
    pub id: ProviderKeyId,
    pub user_id: String,
    pub organization_id: String,
    pub provider: Provider,
    pub encrypted_key: String,
    pub is_active: bool,
    pub last_used: Option<DateTime<Utc>>,
    pub last_tested: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl StorageEntity for ProviderKey {
    type Key = ProviderKeyId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

impl ProviderKey {
    pub fn new(owner: &Identity, provider: Provider, encrypted_key: impl Into<String>) -> Self {
        Self {
            id: ProviderKeyId::generate(),
            user_id: owner.user_id.clone(),
            organization_id: owner.organization_id.clone(),
            provider,
            encrypted_key: encrypted_key.into(),
            is_active: true,
            last_used: None,
            last_tested: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, owner: &Identity) -> bool {
        self.user_id == owner.user_id && self.organization_id == owner.organization_id
    }

    pub fn summary(&self) -> ProviderKeySummary {
        ProviderKeySummary {
            id: self.id.clone(),
            provider: self.provider,
            masked_key: if self.encrypted_key.is_empty() {
                String::new()
            } else {
                MASKED_KEY.to_string()
            },
            is_active: self.is_active,
            last_used: self.last_used,
            last_tested: self.last_tested,
            created_at: self.created_at,
        }
    }
}

/// A stored key as shown to clients; carries no secret material
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderKeySummary {
    pub id: ProviderKeyId,
    pub provider: Provider,
    pub masked_key: String,
    pub is_active: bool,
    pub last_used: Option<DateTime<Utc>>,
    pub last_tested: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_key_is_active_and_untested() {
        let owner = Identity::new("u1", "org1");
        let key = ProviderKey::new(&owner, Provider::OpenAi, "nonce:cipher");

        assert!(key.id.as_str().starts_with("pk-"));
        assert!(key.is_active);
        assert!(key.last_used.is_none());
        assert!(key.last_tested.is_none());
        assert!(key.is_owned_by(&owner));
        assert!(!key.is_owned_by(&Identity::new("u1", "org2")));
    }

    #[test]
    fn test_summary_never_contains_secret() {
        let owner = Identity::new("u1", "org1");
        let key = ProviderKey::new(&owner, Provider::Claude, "sk-ant-REDACTED");

        let summary = key.summary();
        assert_eq!(summary.masked_key, MASKED_KEY);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("sk-ant"));
        assert!(!json.contains("encrypted_key"));
    }
}
