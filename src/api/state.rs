//! Application state for shared services

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::DomainError;
use crate::domain::identity::Identity;
use crate::domain::provider::{Provider, ProviderCatalog};
use crate::domain::provider_key::{
    AdminKeyCheck, KeyValidation, ProviderKeyId, ProviderKeyRepository, ProviderKeySummary,
};
use crate::domain::team::{MemberUsage, TeamStats};
use crate::domain::use_case::UseCaseCatalog;
use crate::domain::usage::{
    Alert, AlertRepository, Budget, BudgetRepository, DashboardMetrics, Timeframe, UsageLog,
    UsageLogRepository,
};
use crate::infrastructure::provider_key::{ProviderKeyService, SavedProviderKey};
use crate::infrastructure::team::TeamStatsService;
use crate::infrastructure::usage::{
    CreateAlertRequest, CreateBudgetRequest, RecordUsageRequest, UsageFilter, UsageReport,
    UsageService,
};

/// Shared services, held behind trait objects so handlers never see the
/// storage backend
#[derive(Clone)]
pub struct AppState {
    pub use_cases: &'static UseCaseCatalog,
    pub providers: &'static ProviderCatalog,
    pub provider_key_service: Arc<dyn ProviderKeyServiceTrait>,
    pub usage_service: Arc<dyn UsageServiceTrait>,
    pub team_service: Arc<dyn TeamStatsServiceTrait>,
}

impl AppState {
    pub fn new(
        provider_key_service: Arc<dyn ProviderKeyServiceTrait>,
        usage_service: Arc<dyn UsageServiceTrait>,
        team_service: Arc<dyn TeamStatsServiceTrait>,
    ) -> Self {
        Self {
            use_cases: UseCaseCatalog::embedded(),
            providers: ProviderCatalog::embedded(),
            provider_key_service,
            usage_service,
            team_service,
        }
    }
}

#[async_trait::async_trait]
pub trait ProviderKeyServiceTrait: Send + Sync {
    async fn list(&self, owner: &Identity) -> Result<Vec<ProviderKeySummary>, DomainError>;
    async fn save(
        &self,
        owner: &Identity,
        provider: Provider,
        secret: &str,
    ) -> Result<SavedProviderKey, DomainError>;
    async fn get_secret(
        &self,
        owner: &Identity,
        provider: Provider,
    ) -> Result<Option<String>, DomainError>;
    async fn delete_by_provider(
        &self,
        owner: &Identity,
        provider: Provider,
    ) -> Result<(), DomainError>;
    async fn delete_by_id(&self, owner: &Identity, id: &ProviderKeyId)
        -> Result<(), DomainError>;
    async fn test(&self, owner: &Identity, provider: Provider)
        -> Result<KeyValidation, DomainError>;
    async fn test_by_id(
        &self,
        owner: &Identity,
        id: &ProviderKeyId,
    ) -> Result<KeyValidation, DomainError>;
    async fn test_admin(
        &self,
        owner: &Identity,
        secret: Option<&str>,
    ) -> Result<AdminKeyCheck, DomainError>;
}

#[async_trait::async_trait]
pub trait UsageServiceTrait: Send + Sync {
    async fn record(
        &self,
        owner: &Identity,
        request: RecordUsageRequest,
    ) -> Result<UsageLog, DomainError>;
    async fn list(
        &self,
        owner: &Identity,
        filter: UsageFilter,
        now: DateTime<Utc>,
    ) -> Result<UsageReport, DomainError>;
    async fn create_budget(
        &self,
        owner: &Identity,
        request: CreateBudgetRequest,
    ) -> Result<Budget, DomainError>;
    async fn list_budgets(
        &self,
        owner: &Identity,
        active_only: bool,
    ) -> Result<Vec<Budget>, DomainError>;
    async fn create_alert(
        &self,
        owner: &Identity,
        request: CreateAlertRequest,
    ) -> Result<Alert, DomainError>;
    async fn list_alerts(&self, owner: &Identity) -> Result<Vec<Alert>, DomainError>;
    async fn dashboard(
        &self,
        owner: &Identity,
        timeframe: Timeframe,
        total_users: usize,
        now: DateTime<Utc>,
    ) -> Result<DashboardMetrics, DomainError>;
}

#[async_trait::async_trait]
pub trait TeamStatsServiceTrait: Send + Sync {
    async fn get(&self, organization_id: &str, now: DateTime<Utc>)
        -> Result<TeamStats, DomainError>;
    async fn record(
        &self,
        organization_id: &str,
        usage: MemberUsage,
        now: DateTime<Utc>,
    ) -> Result<TeamStats, DomainError>;
    async fn member_count(&self, organization_id: &str) -> Result<usize, DomainError>;
    async fn reset(&self, organization_id: &str) -> Result<bool, DomainError>;
}

#[async_trait::async_trait]
impl<R: ProviderKeyRepository + 'static> ProviderKeyServiceTrait for ProviderKeyService<R> {
    async fn list(&self, owner: &Identity) -> Result<Vec<ProviderKeySummary>, DomainError> {
        ProviderKeyService::list(self, owner).await
    }

    async fn save(
        &self,
        owner: &Identity,
        provider: Provider,
        secret: &str,
    ) -> Result<SavedProviderKey, DomainError> {
        ProviderKeyService::save(self, owner, provider, secret).await
    }

    async fn get_secret(
        &self,
        owner: &Identity,
        provider: Provider,
    ) -> Result<Option<String>, DomainError> {
        ProviderKeyService::get_secret(self, owner, provider).await
    }

    async fn delete_by_provider(
        &self,
        owner: &Identity,
        provider: Provider,
    ) -> Result<(), DomainError> {
        ProviderKeyService::delete_by_provider(self, owner, provider).await
    }

    async fn delete_by_id(
        &self,
        owner: &Identity,
        id: &ProviderKeyId,
    ) -> Result<(), DomainError> {
        ProviderKeyService::delete_by_id(self, owner, id).await
    }

    async fn test(
        &self,
        owner: &Identity,
        provider: Provider,
    ) -> Result<KeyValidation, DomainError> {
        ProviderKeyService::test(self, owner, provider).await
    }

    async fn test_by_id(
        &self,
        owner: &Identity,
        id: &ProviderKeyId,
    ) -> Result<KeyValidation, DomainError> {
        ProviderKeyService::test_by_id(self, owner, id).await
    }

    async fn test_admin(
        &self,
        owner: &Identity,
        secret: Option<&str>,
    ) -> Result<AdminKeyCheck, DomainError> {
        ProviderKeyService::test_admin(self, owner, secret).await
    }
}

#[async_trait::async_trait]
impl<U, B, A> UsageServiceTrait for UsageService<U, B, A>
where
    U: UsageLogRepository + 'static,
    B: BudgetRepository + 'static,
    A: AlertRepository + 'static,
{
    async fn record(
        &self,
        owner: &Identity,
        request: RecordUsageRequest,
    ) -> Result<UsageLog, DomainError> {
        UsageService::record(self, owner, request).await
    }

    async fn list(
        &self,
        owner: &Identity,
        filter: UsageFilter,
        now: DateTime<Utc>,
    ) -> Result<UsageReport, DomainError> {
        UsageService::list(self, owner, filter, now).await
    }

    async fn create_budget(
        &self,
        owner: &Identity,
        request: CreateBudgetRequest,
    ) -> Result<Budget, DomainError> {
        UsageService::create_budget(self, owner, request).await
    }

    async fn list_budgets(
        &self,
        owner: &Identity,
        active_only: bool,
    ) -> Result<Vec<Budget>, DomainError> {
        UsageService::list_budgets(self, owner, active_only).await
    }

    async fn create_alert(
        &self,
        owner: &Identity,
        request: CreateAlertRequest,
    ) -> Result<Alert, DomainError> {
        UsageService::create_alert(self, owner, request).await
    }

    async fn list_alerts(&self, owner: &Identity) -> Result<Vec<Alert>, DomainError> {
        UsageService::list_alerts(self, owner).await
    }

    async fn dashboard(
        &self,
        owner: &Identity,
        timeframe: Timeframe,
        total_users: usize,
        now: DateTime<Utc>,
    ) -> Result<DashboardMetrics, DomainError> {
        UsageService::dashboard(self, owner, timeframe, total_users, now).await
    }
}

#[async_trait::async_trait]
impl TeamStatsServiceTrait for TeamStatsService {
    async fn get(
        &self,
        organization_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TeamStats, DomainError> {
        TeamStatsService::get(self, organization_id, now).await
    }

    async fn record(
        &self,
        organization_id: &str,
        usage: MemberUsage,
        now: DateTime<Utc>,
    ) -> Result<TeamStats, DomainError> {
        TeamStatsService::record(self, organization_id, usage, now).await
    }

    async fn member_count(&self, organization_id: &str) -> Result<usize, DomainError> {
        TeamStatsService::member_count(self, organization_id).await
    }

    async fn reset(&self, organization_id: &str) -> Result<bool, DomainError> {
        TeamStatsService::reset(self, organization_id).await
    }
}
