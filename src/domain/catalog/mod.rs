//! Business model catalog
//!
//! The catalog is data: seven categories of ten personas each, embedded as
//! TOML and parsed once. Every persona shares the same prompt builder.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::DomainError;

const CATALOG_TOML: &str = include_str!("catalog.toml");

static CATALOG: Lazy<Catalog> = Lazy::new(|| {
    toml::from_str(CATALOG_TOML).unwrap_or_else(|e| {
        error!(error = %e, "Embedded business model catalog failed to parse");
        Catalog::default()
    })
});

/// A persona an API key can be scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogModel {
    pub id: String,
    pub name: String,
    pub expertise_areas: Vec<String>,
}

impl CatalogModel {
    pub fn system_prompt(&self) -> String {
        format!(
            "You are a professional {} with expertise in {}",
            self.name,
            self.expertise_areas.join(", ")
        )
    }

    /// Request data rendered as compact JSON
    pub fn user_prompt(&self, data: &serde_json::Value) -> String {
        data.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(rename = "model", default)]
    pub models: Vec<CatalogModel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(rename = "category", default)]
    categories: Vec<Category>,
}

impl Catalog {
    /// The embedded catalog
    pub fn global() -> &'static Catalog {
        &CATALOG
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn find(&self, category: &str, model: &str) -> Result<&CatalogModel, DomainError> {
        let category_entry = self
            .category(category)
            .ok_or_else(|| DomainError::not_found(format!("Model category {} not found", category)))?;

        category_entry
            .models
            .iter()
            .find(|m| m.id == model)
            .ok_or_else(|| {
                DomainError::not_found(format!("Model {} not found in {}", model, category))
            })
    }

    /// Category id a model belongs to
    pub fn category_of(&self, model: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.models.iter().any(|m| m.id == model))
            .map(|c| c.id.as_str())
    }

    pub fn contains_model(&self, model: &str) -> bool {
        self.category_of(model).is_some()
    }

    pub fn total_models(&self) -> usize {
        self.categories.iter().map(|c| c.models.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_shape() {
        let catalog = Catalog::global();
        assert_eq!(catalog.categories().len(), 7);
        assert_eq!(catalog.total_models(), 70);
        assert!(catalog.categories().iter().all(|c| c.models.len() == 10));
    }

    #[test]
    fn test_model_ids_are_unique() {
        let catalog = Catalog::global();
        let mut ids: Vec<&str> = catalog
            .categories()
            .iter()
            .flat_map(|c| c.models.iter().map(|m| m.id.as_str()))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 70);
    }

    #[test]
    fn test_find_and_system_prompt() {
        let model = Catalog::global()
            .find("project_managers", "healthcare_pm")
            .unwrap();

        assert_eq!(model.name, "Healthcare Project Manager");
        assert_eq!(
            model.system_prompt(),
            "You are a professional Healthcare Project Manager with expertise in \
             Medical Device Development, Clinical Trials, Hospital Operations, FDA Compliance"
        );
    }

    #[test]
    fn test_find_errors() {
        let catalog = Catalog::global();

        let err = catalog.find("astronauts", "healthcare_pm").unwrap_err();
        assert_eq!(err.message(), "Model category astronauts not found");

        let err = catalog.find("consultants", "healthcare_pm").unwrap_err();
        assert_eq!(err.message(), "Model healthcare_pm not found in consultants");
    }

    #[test]
    fn test_category_of() {
        let catalog = Catalog::global();
        assert_eq!(catalog.category_of("data_scientist"), Some("technical_specialists"));
        assert_eq!(catalog.category_of("estate_planner"), Some("service_providers"));
        assert_eq!(catalog.category_of("wizard"), None);
    }

    #[test]
    fn test_user_prompt_is_compact_json() {
        let model = Catalog::global().find("researchers", "data_analyst").unwrap();
        let prompt = model.user_prompt(&serde_json::json!({"task": "churn"}));
        assert_eq!(prompt, r#"{"task":"churn"}"#);
    }
}
