//! Alert entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::identity::Identity;
use crate::domain::storage::StorageEntity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    pub alert_type: String,
    pub message: String,
    pub threshold: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl StorageEntity for Alert {
    type Key = String;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

impl Alert {
    pub fn new(
        owner: &Identity,
        alert_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("alert-{}", uuid::Uuid::new_v4()),
            organization_id: owner.organization_id.clone(),
            user_id: owner.user_id.clone(),
            alert_type: alert_type.into(),
            message: message.into(),
            threshold: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
