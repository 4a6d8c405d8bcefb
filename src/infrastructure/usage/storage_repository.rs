//! Storage-backed usage, budget and alert repositories

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::storage::Storage;
use crate::domain::usage::{
    Alert, AlertRepository, Budget, BudgetRepository, UsageLog, UsageLogRepository, UsageQuery,
};

#[derive(Debug)]
pub struct StorageUsageLogRepository {
    storage: Arc<dyn Storage<UsageLog>>,
}

impl StorageUsageLogRepository {
    pub fn new(storage: Arc<dyn Storage<UsageLog>>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl UsageLogRepository for StorageUsageLogRepository {
    async fn record(&self, log: UsageLog) -> Result<UsageLog, DomainError> {
        self.storage.create(log).await
    }

    async fn query(&self, query: &UsageQuery) -> Result<Vec<UsageLog>, DomainError> {
        let mut logs = self.storage.filter(&|log: &UsageLog| query.matches(log)).await?;

        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if let Some(limit) = query.limit {
            logs.truncate(limit);
        }

        Ok(logs)
    }
}

#[derive(Debug)]
pub struct StorageBudgetRepository {
    storage: Arc<dyn Storage<Budget>>,
}

impl StorageBudgetRepository {
    pub fn new(storage: Arc<dyn Storage<Budget>>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl BudgetRepository for StorageBudgetRepository {
    async fn create(&self, budget: Budget) -> Result<Budget, DomainError> {
        self.storage.create(budget).await
    }

    async fn list_for_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<Budget>, DomainError> {
        self.storage
            .filter(&|b: &Budget| b.organization_id == organization_id)
            .await
    }
}

#[derive(Debug)]
pub struct StorageAlertRepository {
    storage: Arc<dyn Storage<Alert>>,
}

impl StorageAlertRepository {
    pub fn new(storage: Arc<dyn Storage<Alert>>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl AlertRepository for StorageAlertRepository {
    async fn create(&self, alert: Alert) -> Result<Alert, DomainError> {
        self.storage.create(alert).await
    }

    async fn list_for_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<Alert>, DomainError> {
        let mut alerts = self
            .storage
            .filter(&|a: &Alert| a.organization_id == organization_id)
            .await?;

        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }
}
