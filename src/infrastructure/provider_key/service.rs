//! Provider key service: encrypted storage, validation and secret lookup

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::DomainError;
use crate::domain::identity::Identity;
use crate::domain::provider::Provider;
use crate::domain::provider_key::{
    AdminKeyCheck, AdminKeyKind, KeyCipher, KeyValidation, KeyValidator, ProviderKey,
    ProviderKeyId, ProviderKeyRepository, ProviderKeySummary, admin_key_kind, mask_secret,
};
use crate::infrastructure::keyed_lock::KeyedLocks;
use crate::infrastructure::observability::record_key_validation;

pub const DEFAULT_SECRET_CACHE_TTL: Duration = Duration::from_secs(300);

/// One owner's key for one provider: the unit of caching and of locking
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct KeySlot {
    user_id: String,
    organization_id: String,
    provider: Provider,
}

impl KeySlot {
    fn new(owner: &Identity, provider: Provider) -> Self {
        Self {
            user_id: owner.user_id.clone(),
            organization_id: owner.organization_id.clone(),
            provider,
        }
    }
}

/// Outcome of storing a key
#[derive(Debug, Clone, Serialize)]
pub struct SavedProviderKey {
    pub key: ProviderKeySummary,
    pub validation: KeyValidation,
}

/// Every read-modify-write of a stored key runs under the lock of its
/// [`KeySlot`], so one slot never holds two keys and a stale copy is never
/// written back over a newer secret.
#[derive(Debug)]
pub struct ProviderKeyService<R: ProviderKeyRepository> {
    repository: Arc<R>,
    validator: Arc<dyn KeyValidator>,
    cipher: KeyCipher,
    cache: Cache<KeySlot, Arc<String>>,
    locks: KeyedLocks<KeySlot>,
}

impl<R: ProviderKeyRepository> ProviderKeyService<R> {
    pub fn new(repository: Arc<R>, validator: Arc<dyn KeyValidator>, cipher: KeyCipher) -> Self {
        Self::with_cache_ttl(repository, validator, cipher, DEFAULT_SECRET_CACHE_TTL)
    }

    pub fn with_cache_ttl(
        repository: Arc<R>,
        validator: Arc<dyn KeyValidator>,
        cipher: KeyCipher,
        ttl: Duration,
    ) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(10_000)
            .build();

        Self {
            repository,
            validator,
            cipher,
            cache,
            locks: KeyedLocks::new(),
        }
    }

    async fn validate(&self, provider: Provider, secret: &str) -> KeyValidation {
        let validation = self.validator.validate(provider, secret).await;
        record_key_validation(provider, &validation);
        validation
    }

    async fn owned_key(
        &self,
        owner: &Identity,
        id: &ProviderKeyId,
    ) -> Result<ProviderKey, DomainError> {
        match self.repository.get(id).await? {
            Some(key) if key.is_owned_by(owner) => Ok(key),
            _ => Err(DomainError::not_found(format!("API key '{}' not found", id))),
        }
    }

    async fn stored_key(
        &self,
        owner: &Identity,
        provider: Provider,
    ) -> Result<ProviderKey, DomainError> {
        self.repository.find(owner, provider).await?.ok_or_else(|| {
            DomainError::not_found(format!(
                "No {} API key configured",
                provider.display_name()
            ))
        })
    }

    /// The owner's keys, newest first, with secrets masked
    pub async fn list(&self, owner: &Identity) -> Result<Vec<ProviderKeySummary>, DomainError> {
        let keys = self.repository.list_for_owner(owner).await?;
        Ok(keys.iter().map(ProviderKey::summary).collect())
    }

    /// Validates `secret` against the provider and stores it encrypted,
    /// replacing any key the owner already has for that provider.
    pub async fn save(
        &self,
        owner: &Identity,
        provider: Provider,
        secret: &str,
    ) -> Result<SavedProviderKey, DomainError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(DomainError::validation("API key is required"));
        }

        let validation = self.validate(provider, secret).await;
        if !validation.is_valid {
            let reason = validation.error.as_deref().unwrap_or("Invalid API key");
            warn!(
                owner = %owner,
                provider = %provider,
                key = %mask_secret(secret),
                reason,
                "Rejected provider key"
            );
            return Err(DomainError::validation(reason));
        }

        let encrypted = self.cipher.encrypt(secret)?;
        let slot = KeySlot::new(owner, provider);
        let _guard = self.locks.lock(&slot).await;

        let mut key = match self.repository.find(owner, provider).await? {
            Some(mut existing) => {
                existing.encrypted_key = encrypted;
                existing
            }
            None => ProviderKey::new(owner, provider, encrypted),
        };
        key.is_active = true;
        key.last_tested = Some(Utc::now());

        let key = self.repository.save(key).await?;
        self.cache.invalidate(&slot).await;

        info!(owner = %owner, provider = %provider, id = %key.id, "Stored provider key");

        Ok(SavedProviderKey {
            key: key.summary(),
            validation,
        })
    }

    /// Decrypted secret for the owner's provider key, if one is stored
    pub async fn get_secret(
        &self,
        owner: &Identity,
        provider: Provider,
    ) -> Result<Option<String>, DomainError> {
        let slot = KeySlot::new(owner, provider);

        if let Some(cached) = self.cache.get(&slot).await {
            debug!(owner = %owner, provider = %provider, "Cache hit for provider key");
            return Ok(Some((*cached).clone()));
        }

        let _guard = self.locks.lock(&slot).await;

        let Some(mut key) = self.repository.find(owner, provider).await? else {
            return Ok(None);
        };
        let secret = self.cipher.decrypt(&key.encrypted_key)?;

        key.last_used = Some(Utc::now());
        self.repository.save(key).await?;

        self.cache.insert(slot, Arc::new(secret.clone())).await;
        Ok(Some(secret))
    }

    pub async fn delete_by_provider(
        &self,
        owner: &Identity,
        provider: Provider,
    ) -> Result<(), DomainError> {
        let _guard = self.locks.lock(&KeySlot::new(owner, provider)).await;
        let key = self.stored_key(owner, provider).await?;
        self.remove(owner, key).await
    }

    pub async fn delete_by_id(
        &self,
        owner: &Identity,
        id: &ProviderKeyId,
    ) -> Result<(), DomainError> {
        let provider = self.owned_key(owner, id).await?.provider;
        let _guard = self.locks.lock(&KeySlot::new(owner, provider)).await;

        let key = self.owned_key(owner, id).await?;
        self.remove(owner, key).await
    }

    /// Caller holds the slot lock
    async fn remove(&self, owner: &Identity, key: ProviderKey) -> Result<(), DomainError> {
        self.repository.delete(&key.id).await?;
        self.cache
            .invalidate(&KeySlot::new(owner, key.provider))
            .await;

        info!(owner = %owner, provider = %key.provider, id = %key.id, "Deleted provider key");
        Ok(())
    }

    /// Re-validates the owner's stored key for `provider`
    pub async fn test(
        &self,
        owner: &Identity,
        provider: Provider,
    ) -> Result<KeyValidation, DomainError> {
        let key = self.stored_key(owner, provider).await?;
        self.retest(owner, key).await
    }

    pub async fn test_by_id(
        &self,
        owner: &Identity,
        id: &ProviderKeyId,
    ) -> Result<KeyValidation, DomainError> {
        let key = self.owned_key(owner, id).await?;
        self.retest(owner, key).await
    }

    /// The provider call runs unlocked; the outcome is only recorded if the
    /// stored secret is still the one that was tested.
    async fn retest(
        &self,
        owner: &Identity,
        tested: ProviderKey,
    ) -> Result<KeyValidation, DomainError> {
        let secret = self.cipher.decrypt(&tested.encrypted_key)?;
        let validation = self.validate(tested.provider, &secret).await;

        let _guard = self.locks.lock(&KeySlot::new(owner, tested.provider)).await;

        match self.repository.get(&tested.id).await? {
            Some(mut current) if current.encrypted_key == tested.encrypted_key => {
                let now = Utc::now();
                current.last_tested = Some(now);
                current.is_active = validation.is_valid;
                if validation.is_valid {
                    current.last_used = Some(now);
                }
                self.repository.save(current).await?;
            }
            _ => {
                debug!(
                    owner = %owner,
                    id = %tested.id,
                    "Key replaced or removed during test; result not recorded"
                );
            }
        }

        Ok(validation)
    }

    /// Checks that `secret`, or the owner's stored Claude key, is an
    /// Anthropic organization admin key
    pub async fn test_admin(
        &self,
        owner: &Identity,
        secret: Option<&str>,
    ) -> Result<AdminKeyCheck, DomainError> {
        let secret = match secret.map(str::trim).filter(|s| !s.is_empty()) {
            Some(explicit) => explicit.to_string(),
            None => {
                let key = self.repository.find(owner, Provider::Claude).await?.ok_or_else(|| {
                    DomainError::not_found("No Claude API key found. Please add one first.")
                })?;
                self.cipher.decrypt(&key.encrypted_key)?
            }
        };

        match admin_key_kind(&secret) {
            Some(AdminKeyKind::Anthropic) => {
                info!(owner = %owner, key = %mask_secret(&secret), "Verified Claude admin key");
                Ok(AdminKeyCheck::anthropic_admin())
            }
            Some(AdminKeyKind::OpenAi) => Err(DomainError::validation(
                "OpenAI admin keys are not supported by this check. Use a Claude admin key (sk-ant-admin)",
            )),
            None => Err(DomainError::validation(
                "Not a Claude admin key. Admin keys start with sk-ant-admin",
            )),
        }
    }
}
