//! Provider key repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{ProviderKey, ProviderKeyId};
use crate::domain::DomainError;
use crate::domain::identity::Identity;
use crate::domain::provider::Provider;

#[async_trait]
pub trait ProviderKeyRepository: Send + Sync + Debug {
    async fn get(&self, id: &ProviderKeyId) -> Result<Option<ProviderKey>, DomainError>;

    /// The owner's key for `provider`, if one is stored
    async fn find(
        &self,
        owner: &Identity,
        provider: Provider,
    ) -> Result<Option<ProviderKey>, DomainError>;

    /// Newest first
    async fn list_for_owner(&self, owner: &Identity) -> Result<Vec<ProviderKey>, DomainError>;

    /// Insert or replace by id
    async fn save(&self, key: ProviderKey) -> Result<ProviderKey, DomainError>;

    async fn delete(&self, id: &ProviderKeyId) -> Result<bool, DomainError>;
}
