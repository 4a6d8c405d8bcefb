use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::provider_key::ProviderEndpoints;
use crate::infrastructure::storage::{PostgresConfig, StorageType};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// `memory` or `postgres`
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    /// Secret the provider key cipher is derived from
    #[serde(default)]
    pub encryption_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_key_cache_ttl_secs")]
    pub key_cache_ttl_secs: u64,
    #[serde(default)]
    pub openai_base_url: Option<String>,
    #[serde(default)]
    pub anthropic_base_url: Option<String>,
    #[serde(default)]
    pub gemini_base_url: Option<String>,
    #[serde(default)]
    pub xai_base_url: Option<String>,
    #[serde(default)]
    pub perplexity_base_url: Option<String>,
    #[serde(default)]
    pub cohere_base_url: Option<String>,
    #[serde(default)]
    pub mistral_base_url: Option<String>,
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_key_cache_ttl_secs() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            key_cache_ttl_secs: default_key_cache_ttl_secs(),
            openai_base_url: None,
            anthropic_base_url: None,
            gemini_base_url: None,
            xai_base_url: None,
            perplexity_base_url: None,
            cohere_base_url: None,
            mistral_base_url: None,
        }
    }
}

impl StorageConfig {
    pub fn storage_type(&self) -> Result<StorageType, crate::domain::DomainError> {
        self.backend.parse()
    }

    pub fn postgres(&self) -> Option<PostgresConfig> {
        self.database_url
            .as_ref()
            .map(|url| PostgresConfig::new(url).with_max_connections(self.max_connections))
    }
}

impl ProvidersConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn key_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.key_cache_ttl_secs)
    }

    /// Default provider URLs with any configured overrides applied
    pub fn endpoints(&self) -> ProviderEndpoints {
        let defaults = ProviderEndpoints::default();
        let pick = |configured: &Option<String>, default: String| {
            configured.clone().unwrap_or(default)
        };

        ProviderEndpoints {
            openai: pick(&self.openai_base_url, defaults.openai),
            anthropic: pick(&self.anthropic_base_url, defaults.anthropic),
            gemini: pick(&self.gemini_base_url, defaults.gemini),
            xai: pick(&self.xai_base_url, defaults.xai),
            perplexity: pick(&self.perplexity_base_url, defaults.perplexity),
            cohere: pick(&self.cohere_base_url, defaults.cohere),
            mistral: pick(&self.mistral_base_url, defaults.mistral),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 3001);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.storage.storage_type().unwrap(), StorageType::InMemory);
        assert!(config.storage.postgres().is_none());
        assert!(config.security.encryption_key.is_none());
        assert_eq!(config.providers.key_cache_ttl(), Duration::from_secs(300));
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_partial_sources_fill_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [logging]
                level = "debug"
                format = "json"

                [storage]
                backend = "postgres"
                database_url = "postgres://localhost/guardian"

                [providers]
                xai_base_url = "http://localhost:9000"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.storage_type().unwrap(), StorageType::Postgres);
        assert_eq!(config.storage.postgres().unwrap().max_connections, 10);

        let endpoints = config.providers.endpoints();
        assert_eq!(endpoints.xai, "http://localhost:9000");
        assert_eq!(endpoints.openai, "https://api.openai.com");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let storage = StorageConfig {
            backend: "mongo".to_string(),
            ..StorageConfig::default()
        };
        assert!(storage.storage_type().is_err());
    }
}
