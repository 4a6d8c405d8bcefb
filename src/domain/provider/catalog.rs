//! Provider pricing table embedded at build time

use once_cell::sync::Lazy;
use serde::Deserialize;

use super::entity::{AiModel, AiProvider};
use crate::domain::DomainError;

pub const EMBEDDED_PROVIDERS: &str = include_str!("../../../data/providers.toml");

static CATALOG: Lazy<ProviderCatalog> = Lazy::new(|| {
    ProviderCatalog::from_toml(EMBEDDED_PROVIDERS).expect("embedded provider table is valid")
});

#[derive(Debug, Deserialize)]
struct ProviderTable {
    pricing_last_updated: String,
    providers: Vec<AiProvider>,
}

/// Enabled providers in table order
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCatalog {
    pricing_last_updated: String,
    providers: Vec<AiProvider>,
}

impl ProviderCatalog {
    pub fn new(pricing_last_updated: impl Into<String>, providers: Vec<AiProvider>) -> Self {
        Self {
            pricing_last_updated: pricing_last_updated.into(),
            providers: providers.into_iter().filter(|p| p.enabled).collect(),
        }
    }

    pub fn from_toml(source: &str) -> Result<Self, DomainError> {
        let table: ProviderTable = toml::from_str(source).map_err(|e| {
            DomainError::configuration(format!("Invalid provider table: {}", e))
        })?;

        Ok(Self::new(table.pricing_last_updated, table.providers))
    }

    pub fn embedded() -> &'static ProviderCatalog {
        &CATALOG
    }

    pub fn providers(&self) -> &[AiProvider] {
        &self.providers
    }

    pub fn get(&self, id: &str) -> Option<&AiProvider> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn pricing_last_updated(&self) -> &str {
        &self.pricing_last_updated
    }

    /// Priced model for `model_id`. Dated ids such as `claude-3-haiku-20240307`
    /// fall back to the longest listed id they extend with a `-` suffix.
    pub fn find_model(&self, model_id: &str) -> Option<&AiModel> {
        let models = || self.providers.iter().flat_map(|p| p.models.iter());

        models().find(|m| m.model_id == model_id).or_else(|| {
            models()
                .filter(|m| {
                    model_id
                        .strip_prefix(m.model_id.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
                })
                .max_by_key(|m| m.model_id.len())
        })
    }
}
