//! Usage, budget and alert repository traits

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Alert, Budget, UsageLog};
use crate::domain::DomainError;

/// Filter for usage logs; every set field must match
#[derive(Debug, Clone, Default)]
pub struct UsageQuery {
    pub organization_id: Option<String>,
    pub user_id: Option<String>,
    pub provider: Option<String>,
    /// Inclusive
    pub from: Option<DateTime<Utc>>,
    /// Exclusive
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl UsageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn for_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn since(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, log: &UsageLog) -> bool {
        self.organization_id
            .as_ref()
            .is_none_or(|org| &log.organization_id == org)
            && self.user_id.as_ref().is_none_or(|user| &log.user_id == user)
            && self
                .provider
                .as_ref()
                .is_none_or(|p| log.provider.eq_ignore_ascii_case(p))
            && self.from.is_none_or(|from| log.timestamp >= from)
            && self.to.is_none_or(|to| log.timestamp < to)
    }
}

#[async_trait]
pub trait UsageLogRepository: Send + Sync + Debug {
    async fn record(&self, log: UsageLog) -> Result<UsageLog, DomainError>;

    /// Newest first, truncated to the query limit
    async fn query(&self, query: &UsageQuery) -> Result<Vec<UsageLog>, DomainError>;
}

#[async_trait]
pub trait BudgetRepository: Send + Sync + Debug {
    async fn create(&self, budget: Budget) -> Result<Budget, DomainError>;

    async fn list_for_organization(&self, organization_id: &str)
        -> Result<Vec<Budget>, DomainError>;
}

#[async_trait]
pub trait AlertRepository: Send + Sync + Debug {
    async fn create(&self, alert: Alert) -> Result<Alert, DomainError>;

    /// Newest first
    async fn list_for_organization(&self, organization_id: &str)
        -> Result<Vec<Alert>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::Identity;
    use chrono::TimeZone;

    fn log_at(day: u32) -> UsageLog {
        UsageLog::new(&Identity::new("u1", "org1"), "OpenAI", 1.0)
            .at(Utc.with_ymd_and_hms(2025, 8, day, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(UsageQuery::new().matches(&log_at(1)));
    }

    #[test]
    fn test_time_window_is_half_open() {
        let query = UsageQuery::new().between(
            Utc.with_ymd_and_hms(2025, 8, 2, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 8, 4, 12, 0, 0).unwrap(),
        );

        assert!(!query.matches(&log_at(1)));
        assert!(query.matches(&log_at(2)));
        assert!(query.matches(&log_at(3)));
        assert!(!query.matches(&log_at(4)));
    }

    #[test]
    fn test_owner_and_provider_filters() {
        let log = log_at(1);

        assert!(UsageQuery::new().for_organization("org1").matches(&log));
        assert!(!UsageQuery::new().for_organization("org2").matches(&log));
        assert!(!UsageQuery::new().for_user("u2").matches(&log));
        assert!(UsageQuery::new().for_provider("openai").matches(&log));
        assert!(!UsageQuery::new().for_provider("claude").matches(&log));
    }
}
