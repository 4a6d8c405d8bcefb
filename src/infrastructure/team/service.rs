//! Per-organization team usage totals

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::DomainError;
use crate::domain::storage::Storage;
use crate::domain::team::{MemberUsage, TeamStats};
use crate::infrastructure::keyed_lock::KeyedLocks;

#[derive(Debug)]
pub struct TeamStatsService {
    storage: Arc<dyn Storage<TeamStats>>,
    locks: KeyedLocks<String>,
}

impl TeamStatsService {
    pub fn new(storage: Arc<dyn Storage<TeamStats>>) -> Self {
        Self {
            storage,
            locks: KeyedLocks::new(),
        }
    }

    /// Members ranked by spend; empty stats when nothing was recorded yet
    pub async fn get(
        &self,
        organization_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TeamStats, DomainError> {
        let stats = self
            .storage
            .get(&organization_id.to_string())
            .await?
            .unwrap_or_else(|| TeamStats::empty(organization_id, now));

        Ok(stats.ranked())
    }

    pub async fn record(
        &self,
        organization_id: &str,
        usage: MemberUsage,
        now: DateTime<Utc>,
    ) -> Result<TeamStats, DomainError> {
        if usage.user_id.trim().is_empty() {
            return Err(DomainError::validation("User id is required"));
        }
        if !usage.spend.is_finite() || usage.spend < 0.0 {
            return Err(DomainError::validation("Spend must be a non-negative number"));
        }

        let key = organization_id.to_string();
        let _guard = self.locks.lock(&key).await;
        let mut stats = self
            .storage
            .get(&key)
            .await?
            .unwrap_or_else(|| TeamStats::empty(organization_id, now));

        debug!(
            organization = organization_id,
            user = %usage.user_id,
            spend = usage.spend,
            "Recording team member usage"
        );
        stats.record(usage, now)?;

        Ok(self.storage.save(stats).await?.ranked())
    }

    /// Number of members with recorded usage
    pub async fn member_count(&self, organization_id: &str) -> Result<usize, DomainError> {
        Ok(self
            .storage
            .get(&organization_id.to_string())
            .await?
            .map_or(0, |stats| stats.members.len()))
    }

    /// Returns true if there was anything to clear
    pub async fn reset(&self, organization_id: &str) -> Result<bool, DomainError> {
        let key = organization_id.to_string();
        let _guard = self.locks.lock(&key).await;
        let removed = self.storage.delete(&key).await?;
        if removed {
            info!(organization = organization_id, "Reset team stats");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::mock::MockStorage;
    use crate::infrastructure::storage::InMemoryStorage;
    use async_trait::async_trait;
    use chrono::TimeZone;

    /// Yields to the scheduler before every storage call so concurrent
    /// callers interleave between read and write
    #[derive(Debug)]
    struct YieldingStorage(InMemoryStorage<TeamStats>);

    #[async_trait]
    impl Storage<TeamStats> for YieldingStorage {
        async fn get(&self, key: &String) -> Result<Option<TeamStats>, DomainError> {
            tokio::task::yield_now().await;
            self.0.get(key).await
        }

        async fn list(&self) -> Result<Vec<TeamStats>, DomainError> {
            self.0.list().await
        }

        async fn create(&self, entity: TeamStats) -> Result<TeamStats, DomainError> {
            tokio::task::yield_now().await;
            self.0.create(entity).await
        }

        async fn update(&self, entity: TeamStats) -> Result<TeamStats, DomainError> {
            tokio::task::yield_now().await;
            self.0.update(entity).await
        }

        async fn save(&self, entity: TeamStats) -> Result<TeamStats, DomainError> {
            tokio::task::yield_now().await;
            self.0.save(entity).await
        }

        async fn delete(&self, key: &String) -> Result<bool, DomainError> {
            tokio::task::yield_now().await;
            self.0.delete(key).await
        }
    }

    fn service() -> TeamStatsService {
        TeamStatsService::new(Arc::new(InMemoryStorage::<TeamStats>::new()))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 20, 12, 0, 0).unwrap()
    }

    fn usage(user: &str, requests: u64, spend: f64) -> MemberUsage {
        MemberUsage {
            user_id: user.to_string(),
            name: None,
            email: None,
            role: None,
            requests,
            tokens: requests * 100,
            spend,
        }
    }

    #[tokio::test]
    async fn test_get_empty_organization() {
        let stats = service().get("acme", now()).await.unwrap();
        assert_eq!(stats.organization_id, "acme");
        assert!(stats.members.is_empty());
    }

    #[tokio::test]
    async fn test_record_accumulates_and_ranks() {
        let service = service();
        service.record("acme", usage("alice", 1, 2.0), now()).await.unwrap();
        service.record("acme", usage("bob", 3, 5.0), now()).await.unwrap();
        service.record("acme", usage("alice", 2, 4.5), now()).await.unwrap();

        let stats = service.get("acme", now()).await.unwrap();
        let order: Vec<&str> = stats.members.iter().map(|m| m.user_id.as_str()).collect();
        assert_eq!(order, vec!["alice", "bob"]);
        assert_eq!(stats.members[0].requests, 3);
        assert_eq!(stats.members[0].spend, 6.5);
        assert_eq!(service.member_count("acme").await.unwrap(), 2);
        assert_eq!(service.member_count("globex").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_validates() {
        let service = service();
        assert!(service.record("acme", usage(" ", 1, 1.0), now()).await.is_err());
        assert!(service.record("acme", usage("a", 1, f64::NAN), now()).await.is_err());
    }

    #[tokio::test]
    async fn test_reset() {
        let service = service();
        service.record("acme", usage("alice", 1, 1.0), now()).await.unwrap();

        assert!(service.reset("acme").await.unwrap());
        assert!(!service.reset("acme").await.unwrap());
        assert!(service.get("acme", now()).await.unwrap().members.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure() {
        let storage = MockStorage::<TeamStats>::new().with_error("offline");
        let service = TeamStatsService::new(Arc::new(storage));
        assert!(matches!(
            service.get("acme", now()).await,
            Err(DomainError::Storage { .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_records_keep_every_delta() {
        let service = TeamStatsService::new(Arc::new(YieldingStorage(
            InMemoryStorage::<TeamStats>::new(),
        )));

        let (first, second, third) = tokio::join!(
            service.record("acme", usage("alice", 1, 1.0), now()),
            service.record("acme", usage("alice", 2, 2.0), now()),
            service.record("acme", usage("bob", 4, 4.0), now()),
        );
        first.unwrap();
        second.unwrap();
        third.unwrap();

        let stats = service.get("acme", now()).await.unwrap();
        assert_eq!(stats.members.len(), 2);
        let alice = stats.members.iter().find(|m| m.user_id == "alice").unwrap();
        assert_eq!(alice.requests, 3);
        assert_eq!(alice.tokens, 300);
        assert_eq!(alice.spend, 3.0);
    }

    #[tokio::test]
    async fn test_record_rejects_token_overflow() {
        let service = service();
        service.record("acme", usage("alice", 1, 1.0), now()).await.unwrap();

        let overflow = MemberUsage {
            tokens: u64::MAX,
            ..usage("alice", 1, 1.0)
        };
        assert!(matches!(
            service.record("acme", overflow, now()).await,
            Err(DomainError::Validation { .. })
        ));

        let stats = service.get("acme", now()).await.unwrap();
        assert_eq!(stats.members[0].tokens, 100);
        assert_eq!(stats.members[0].spend, 1.0);
    }
}
