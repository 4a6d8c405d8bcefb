//! Static use-case catalog embedded at build time

use once_cell::sync::Lazy;

use super::entity::{DetailedUseCase, ModelUseCases};
use crate::domain::DomainError;

pub const EMBEDDED_USE_CASES: &str = include_str!("../../../data/use_cases.json");

static CATALOG: Lazy<UseCaseCatalog> = Lazy::new(|| {
    UseCaseCatalog::from_json(EMBEDDED_USE_CASES).expect("embedded use-case catalog is valid")
});

/// Use cases grouped by model, preserving the authored order of both
#[derive(Debug, Clone, PartialEq)]
pub struct UseCaseCatalog {
    groups: Vec<ModelUseCases>,
}

impl UseCaseCatalog {
    pub fn new(groups: Vec<ModelUseCases>) -> Self {
        Self { groups }
    }

    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let groups: Vec<ModelUseCases> = serde_json::from_str(json).map_err(|e| {
            DomainError::configuration(format!("Invalid use-case catalog: {}", e))
        })?;

        Ok(Self::new(groups))
    }

    /// The catalog compiled into the binary
    pub fn embedded() -> &'static UseCaseCatalog {
        &CATALOG
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.model.as_str())
    }

    /// Every use case, model by model
    pub fn iter(&self) -> impl Iterator<Item = &DetailedUseCase> {
        self.groups.iter().flat_map(|g| g.use_cases.iter())
    }

    pub fn all(&self) -> Vec<&DetailedUseCase> {
        self.iter().collect()
    }

    /// Use cases authored for `model`; empty for unknown models
    pub fn for_model(&self, model: &str) -> &[DetailedUseCase] {
        self.groups
            .iter()
            .find(|g| g.model == model)
            .map(|g| g.use_cases.as_slice())
            .unwrap_or(&[])
    }

    pub fn get(&self, id: &str) -> Option<&DetailedUseCase> {
        self.iter().find(|u| u.id == id)
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.use_cases.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_parses() {
        let catalog = UseCaseCatalog::embedded();

        assert_eq!(
            catalog.models().collect::<Vec<_>>(),
            vec!["gpt-4o-mini", "claude-3-haiku-20240307"]
        );
        assert_eq!(catalog.len(), 60);
        assert_eq!(catalog.for_model("gpt-4o-mini").len(), 30);
        assert_eq!(catalog.for_model("claude-3-haiku-20240307").len(), 30);
    }

    #[test]
    fn test_catalog_order_is_preserved() {
        let ids: Vec<&str> = UseCaseCatalog::embedded()
            .iter()
            .map(|u| u.id.as_str())
            .collect();

        assert_eq!(ids[0], "mini-1");
        assert_eq!(ids[29], "mini-30");
        assert_eq!(ids[30], "haiku-1");
        assert_eq!(ids[59], "haiku-30");
    }

    #[test]
    fn test_get_by_id() {
        let catalog = UseCaseCatalog::embedded();

        let regex = catalog.get("haiku-10").unwrap();
        assert_eq!(regex.title, "Regex Patterns");
        assert!(regex.tags.contains(&"regex".to_string()));

        assert!(catalog.get("mini-999").is_none());
    }

    #[test]
    fn test_unknown_model_is_empty() {
        assert!(UseCaseCatalog::embedded().for_model("gpt-5").is_empty());
    }

    #[test]
    fn test_invalid_json_is_configuration_error() {
        let result = UseCaseCatalog::from_json("{ not json");
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_every_use_case_recommends_its_model() {
        let catalog = UseCaseCatalog::embedded();

        for model in catalog.models() {
            for use_case in catalog.for_model(model) {
                assert_eq!(use_case.recommended_models.primary, model, "{}", use_case.id);
            }
        }
    }
}
