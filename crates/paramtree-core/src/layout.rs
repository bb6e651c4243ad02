//! Declarative tree layouts.
//!
//! A layout file describes categories, their parents and their items. It is
//! only ever read: building a layout seeds a fresh [`CategoryTree`].
//!
//! ```toml
//! [[category]]
//! key = "company"
//! label = "Company"
//! description = "root"
//!
//! [[category.item]]
//! label = "budget"
//! value = 500
//!
//! [[category]]
//! label = "Engineering"
//! description = "eng"
//! parent = "company"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ParamError, Result};
use crate::factory::ParameterFactory;
use crate::registry::CategoryRegistry;
use crate::tree::{CategoryId, CategoryTree};
use crate::value::ParamValue;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeLayout {
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    /// Reference name used by `parent`; defaults to the label.
    #[serde(default)]
    pub key: Option<String>,
    pub label: String,
    pub description: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default, rename = "item")]
    pub items: Vec<ItemEntry>,
}

impl CategoryEntry {
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.label)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemEntry {
    pub label: String,
    pub value: toml::Value,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Layout keys mapped to the categories they produced, in file order.
#[derive(Debug, Clone, Default)]
pub struct LayoutIndex {
    order: Vec<String>,
    ids: HashMap<String, CategoryId>,
}

impl LayoutIndex {
    pub fn get(&self, key: &str) -> Option<CategoryId> {
        self.ids.get(key).copied()
    }

    /// Like [`get`](Self::get) but reports an unknown key as a layout error.
    pub fn require(&self, key: &str) -> Result<CategoryId> {
        self.get(key)
            .ok_or_else(|| ParamError::layout(format!("no category with key '{}'", key)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl TreeLayout {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Create every category, then attach parents in file order, then add
    /// items. The first failure stops the build.
    pub fn build(
        &self,
        factory: &ParameterFactory,
        tree: &CategoryTree,
        registry: &mut CategoryRegistry,
    ) -> Result<LayoutIndex> {
        let mut index = LayoutIndex::default();

        for entry in &self.categories {
            let key = entry.key();
            if index.ids.contains_key(key) {
                return Err(ParamError::layout(format!("duplicate key '{}'", key)));
            }
            let id = factory.create_category(tree, registry, &entry.label, &entry.description)?;
            index.order.push(key.to_string());
            index.ids.insert(key.to_string(), id);
        }

        for entry in &self.categories {
            let Some(parent_key) = entry.parent.as_deref() else {
                continue;
            };
            let parent = index.get(parent_key).ok_or_else(|| {
                ParamError::layout(format!(
                    "category '{}' names unknown parent '{}'",
                    entry.key(),
                    parent_key
                ))
            })?;
            tree.attach_parent(index.require(entry.key())?, parent)?;
        }

        for entry in &self.categories {
            let id = index.require(entry.key())?;
            for item in &entry.items {
                let value = ParamValue::try_from(item.value.clone())?;
                tree.add_item(id, factory.create_item(&item.label, value, item.active)?)?;
            }
        }

        tracing::debug!(
            target: "paramtree_core::layout",
            categories = index.len(),
            "built layout"
        );
        Ok(index)
    }
}
