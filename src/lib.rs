//! AI Cost Guardian
//!
//! Spend tracking, provider key management and model guidance across AI
//! providers, served over a JSON API.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, distributions::Alphanumeric};
use tracing::{info, warn};

use api::state::AppState;
use domain::DomainError;
use domain::provider_key::{KeyCipher, KeyValidator, ProviderKey};
use domain::team::TeamStats;
use domain::usage::{Alert, Budget, UsageLog};
use infrastructure::provider_key::{
    HttpKeyValidator, ProviderKeyService, StorageProviderKeyRepository,
};
use infrastructure::storage::{StorageFactory, StorageType};
use infrastructure::team::TeamStatsService;
use infrastructure::usage::{
    StorageAlertRepository, StorageBudgetRepository, StorageUsageLogRepository, UsageService,
};

/// Builds every service from the configuration: storage backend, key
/// cipher and the HTTP key validator
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_type = config.storage.storage_type()?;
    info!(backend = ?storage_type, "Storage backend selected");

    let factory = StorageFactory::connect(storage_type, config.storage.postgres().as_ref()).await?;
    let cipher = KeyCipher::new(&encryption_secret(config, storage_type)?)?;
    let validator = Arc::new(HttpKeyValidator::new(
        config.providers.endpoints(),
        config.providers.timeout(),
    )?);

    let state =
        build_app_state(&factory, validator, cipher, config.providers.key_cache_ttl()).await?;
    Ok(state)
}

/// Wires services over storage from `factory`
pub async fn build_app_state(
    factory: &StorageFactory,
    validator: Arc<dyn KeyValidator>,
    cipher: KeyCipher,
    key_cache_ttl: Duration,
) -> Result<AppState, DomainError> {
    let key_repository = Arc::new(StorageProviderKeyRepository::new(
        factory.create::<ProviderKey>("provider_keys").await?,
    ));
    let usage_repository = Arc::new(StorageUsageLogRepository::new(
        factory.create::<UsageLog>("usage_logs").await?,
    ));
    let budget_repository = Arc::new(StorageBudgetRepository::new(
        factory.create::<Budget>("budgets").await?,
    ));
    let alert_repository = Arc::new(StorageAlertRepository::new(
        factory.create::<Alert>("alerts").await?,
    ));
    let team_storage = factory.create::<TeamStats>("team_stats").await?;

    Ok(AppState::new(
        Arc::new(ProviderKeyService::with_cache_ttl(
            key_repository,
            validator,
            cipher,
            key_cache_ttl,
        )),
        Arc::new(UsageService::new(
            usage_repository,
            budget_repository,
            alert_repository,
        )),
        Arc::new(TeamStatsService::new(team_storage)),
    ))
}

/// Persistent storage needs a stable secret; in-memory storage falls back
/// to a random one since nothing outlives the process
fn encryption_secret(config: &AppConfig, storage_type: StorageType) -> anyhow::Result<String> {
    match (&config.security.encryption_key, storage_type) {
        (Some(key), _) if !key.trim().is_empty() => Ok(key.clone()),
        (_, StorageType::Postgres) => Err(anyhow::anyhow!(
            "security.encryption_key is required with the postgres backend"
        )),
        (_, StorageType::InMemory) => {
            warn!("security.encryption_key not set; using a random per-process key");
            Ok(rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(48)
                .map(char::from)
                .collect())
        }
    }
}
