//! Usage log entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::identity::Identity;
use crate::domain::storage::StorageEntity;

/// One billed provider request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLog {
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    pub provider: String,
    pub model: Option<String>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    /// USD
    pub cost: f64,
    pub timestamp: DateTime<Utc>,
}

impl StorageEntity for UsageLog {
    type Key = String;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

impl UsageLog {
    pub fn new(owner: &Identity, provider: impl Into<String>, cost: f64) -> Self {
        Self {
            id: format!("usage-{}", uuid::Uuid::new_v4()),
            organization_id: owner.organization_id.clone(),
            user_id: owner.user_id.clone(),
            provider: provider.into(),
            model: None,
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            cost,
            timestamp: Utc::now(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// The total saturates at `u64::MAX`
    pub fn with_tokens(mut self, prompt: u64, completion: u64) -> Self {
        self.prompt_tokens = prompt;
        self.completion_tokens = completion;
        self.total_tokens = prompt.saturating_add(completion);
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let owner = Identity::new("u1", "org1");
        let log = UsageLog::new(&owner, "openai", 0.25)
            .with_model("gpt-4")
            .with_tokens(100, 50);

        assert!(log.id.starts_with("usage-"));
        assert_eq!(log.organization_id, "org1");
        assert_eq!(log.user_id, "u1");
        assert_eq!(log.total_tokens, 150);
        assert_eq!(log.model.as_deref(), Some("gpt-4"));
    }

    #[test]
    fn test_token_total_saturates() {
        let owner = Identity::new("u1", "org1");
        let log = UsageLog::new(&owner, "openai", 0.0).with_tokens(u64::MAX, 1);

        assert_eq!(log.total_tokens, u64::MAX);
        assert_eq!(log.completion_tokens, 1);
    }
}
