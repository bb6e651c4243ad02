use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::item::ParameterItem;
use crate::registry::CategoryRegistry;
use crate::tree::{CategoryId, CategoryTree};
use crate::value::{ParamValue, ValueTypeValidator};

/// Builds categories and items under one value-kind policy.
///
/// The tree and the registry are passed in by the caller; the factory keeps
/// no state besides its validator.
#[derive(Debug, Clone, Default)]
pub struct ParameterFactory {
    validator: ValueTypeValidator,
}

impl ParameterFactory {
    pub fn new(validator: ValueTypeValidator) -> Self {
        Self { validator }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.validator())
    }

    pub fn validator(&self) -> &ValueTypeValidator {
        &self.validator
    }

    /// Create a root category in `tree` and record it in `registry`.
    pub fn create_category(
        &self,
        tree: &CategoryTree,
        registry: &mut CategoryRegistry,
        label: &str,
        description: &str,
    ) -> Result<CategoryId> {
        let id = tree.create_category(label, description)?;
        registry.add(id);
        Ok(id)
    }

    /// Create an item after checking its value kind against the validator.
    pub fn create_item(
        &self,
        label: &str,
        value: impl Into<ParamValue>,
        active: bool,
    ) -> Result<Arc<ParameterItem>> {
        let value = self.validator.validate(value.into())?;
        Ok(Arc::new(ParameterItem::new(label, value, active)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParamError;
    use crate::value::ValueKind;
    use chrono::Utc;
    use std::path::PathBuf;

    #[test]
    fn test_create_category_registers() {
        let factory = ParameterFactory::default();
        let tree = CategoryTree::new();
        let mut registry = CategoryRegistry::new();

        let id = factory
            .create_category(&tree, &mut registry, "Label 1", "Description 1")
            .unwrap();
        assert_eq!(registry.categories(), &[id]);
        assert!(tree.is_root(id).unwrap());

        // failed creation leaves the registry alone
        assert!(factory
            .create_category(&tree, &mut registry, "", "Description")
            .is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_item_kinds() {
        let factory = ParameterFactory::default();
        let text = factory.create_item("Label 1", "Value", false).unwrap();
        assert_eq!(text.value(), &ParamValue::from("Value"));
        assert!(!text.is_active());

        let number = factory.create_item("Label 1", 2, false).unwrap();
        assert_eq!(number.value().kind(), ValueKind::Number);

        let now = Utc::now();
        let date = factory.create_item("Item 3", now, true).unwrap();
        assert_eq!(date.value(), &ParamValue::DateTime(now));
    }

    #[test]
    fn test_restricted_factory_rejects_path() {
        let factory = ParameterFactory::new(ValueTypeValidator::new([
            ValueKind::Text,
            ValueKind::Number,
            ValueKind::DateTime,
        ]));
        let err = factory
            .create_item("Label 1", PathBuf::from("Value"), false)
            .unwrap_err();
        assert!(matches!(err, ParamError::InvalidValueType { .. }));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.set("values.allowed", "text").unwrap();
        let factory = ParameterFactory::from_config(&config);
        assert!(factory.create_item("a", "x", true).is_ok());
        assert!(factory.create_item("a", 1, true).is_err());
    }
}
