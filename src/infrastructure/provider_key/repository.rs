//! Storage-backed provider key repository

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::identity::Identity;
use crate::domain::provider::Provider;
use crate::domain::provider_key::{ProviderKey, ProviderKeyId, ProviderKeyRepository};
use crate::domain::storage::Storage;

#[derive(Debug)]
pub struct StorageProviderKeyRepository {
    storage: Arc<dyn Storage<ProviderKey>>,
}

impl StorageProviderKeyRepository {
    pub fn new(storage: Arc<dyn Storage<ProviderKey>>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl ProviderKeyRepository for StorageProviderKeyRepository {
    async fn get(&self, id: &ProviderKeyId) -> Result<Option<ProviderKey>, DomainError> {
        self.storage.get(id).await
    }

    async fn find(
        &self,
        owner: &Identity,
        provider: Provider,
    ) -> Result<Option<ProviderKey>, DomainError> {
        let matches = self
            .storage
            .filter(&|k: &ProviderKey| k.is_owned_by(owner) && k.provider == provider)
            .await?;

        Ok(matches.into_iter().next())
    }

    async fn list_for_owner(&self, owner: &Identity) -> Result<Vec<ProviderKey>, DomainError> {
        let mut keys = self
            .storage
            .filter(&|k: &ProviderKey| k.is_owned_by(owner))
            .await?;

        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(keys)
    }

    async fn save(&self, key: ProviderKey) -> Result<ProviderKey, DomainError> {
        self.storage.save(key).await
    }

    async fn delete(&self, id: &ProviderKeyId) -> Result<bool, DomainError> {
        self.storage.delete(id).await
    }
}
