use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use slotmap::SlotMap;

use crate::error::{ParamError, Result};
use crate::item::ParameterItem;

use super::node::{CategoryId, CategoryNode, Level};

const TARGET: &str = "paramtree_core::tree";

/// Arena holding every category of one hierarchy.
///
/// Item mutation locks only the category it touches. Edge mutation is
/// serialized tree-wide so the ancestor walk and the two-sided write see the
/// same shape.
pub struct CategoryTree {
    nodes: RwLock<SlotMap<CategoryId, Arc<CategoryNode>>>,
    edges: Mutex<()>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(SlotMap::with_key()),
            edges: Mutex::new(()),
        }
    }

    pub(crate) fn node(&self, id: CategoryId) -> Result<Arc<CategoryNode>> {
        self.nodes
            .read()
            .get(id)
            .cloned()
            .ok_or(ParamError::MissingCategory)
    }

    /// Create a new root category with no items and no children.
    pub fn create_category(
        &self,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<CategoryId> {
        let label = label.into();
        let description = description.into();

        if label.trim().is_empty() {
            return Err(ParamError::validation(
                "label",
                "category label must not be empty",
            ));
        }
        if description.trim().is_empty() {
            return Err(ParamError::validation(
                "description",
                format!("category '{}' needs a description", label),
            ));
        }

        let node = Arc::new(CategoryNode::new(label, description));
        let id = self.nodes.write().insert(Arc::clone(&node));
        tracing::trace!(target: TARGET, ?id, label = %node.label, "created category");
        Ok(id)
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.nodes.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Categories without a parent.
    pub fn roots(&self) -> Vec<CategoryId> {
        let nodes = self.nodes.read();
        nodes
            .iter()
            .filter(|(_, node)| node.parent().is_none())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn label(&self, id: CategoryId) -> Result<String> {
        Ok(self.node(id)?.label.clone())
    }

    pub fn description(&self, id: CategoryId) -> Result<String> {
        Ok(self.node(id)?.description.clone())
    }

    pub fn level(&self, id: CategoryId) -> Result<Level> {
        Ok(self.node(id)?.link.read().level)
    }

    pub fn parent(&self, id: CategoryId) -> Result<Option<CategoryId>> {
        Ok(self.node(id)?.parent())
    }

    /// Direct children in attachment order.
    pub fn children(&self, id: CategoryId) -> Result<Vec<CategoryId>> {
        Ok(self.node(id)?.children())
    }

    pub fn is_root(&self, id: CategoryId) -> Result<bool> {
        Ok(self.node(id)?.parent().is_none())
    }

    /// A leaf has a parent and no children. A lone root is not a leaf.
    pub fn is_leaf(&self, id: CategoryId) -> Result<bool> {
        let node = self.node(id)?;
        let link = node.link.read();
        Ok(link.parent.is_some() && link.children.is_empty())
    }

    /// True when both categories have a parent and it is the same one.
    pub fn are_siblings(&self, a: CategoryId, b: CategoryId) -> Result<bool> {
        let first = self.node(a)?.parent();
        let second = self.node(b)?.parent();
        Ok(matches!((first, second), (Some(x), Some(y)) if x == y))
    }

    // ---------------------------------------------------------------------
    // Items
    // ---------------------------------------------------------------------

    /// Add an item. Fails if the category already holds an item with the same
    /// label; ancestors are not consulted.
    pub fn add_item(&self, id: CategoryId, item: Arc<ParameterItem>) -> Result<()> {
        let node = self.node(id)?;
        let mut items = node.items.write();

        if items.contains_key(item.label()) {
            return Err(ParamError::DuplicateItemLabel {
                category: node.label.clone(),
                label: item.label().to_string(),
            });
        }

        tracing::trace!(target: TARGET, ?id, item = item.label(), "added item");
        items.insert(item.label().to_string(), item);
        Ok(())
    }

    /// Remove `item` if the category holds it (same label and an equal item).
    ///
    /// Returns whether anything was removed. Removing an absent item is not an
    /// error.
    pub fn remove_item(&self, id: CategoryId, item: &ParameterItem) -> Result<bool> {
        let node = self.node(id)?;
        let mut items = node.items.write();

        let matches = items
            .get(item.label())
            .is_some_and(|existing| std::ptr::eq(existing.as_ref(), item) || **existing == *item);
        if matches {
            items.remove(item.label());
            tracing::trace!(target: TARGET, ?id, item = item.label(), "removed item");
        }
        Ok(matches)
    }

    /// Copy of the category's own items.
    pub fn items(&self, id: CategoryId) -> Result<HashMap<String, Arc<ParameterItem>>> {
        Ok(self.node(id)?.items.read().clone())
    }

    pub fn item(&self, id: CategoryId, label: &str) -> Result<Option<Arc<ParameterItem>>> {
        Ok(self.node(id)?.items.read().get(label).cloned())
    }

    // ---------------------------------------------------------------------
    // Edges
    // ---------------------------------------------------------------------

    /// Make `parent` the parent of `child`.
    ///
    /// Every check runs before anything is written, so a failed call leaves
    /// both categories untouched.
    #[tracing::instrument(skip(self), target = "paramtree_core::tree", level = "debug")]
    pub fn attach_parent(&self, child: CategoryId, parent: CategoryId) -> Result<()> {
        let _edges = self.edges.lock();

        let child_node = self.node(child)?;
        let parent_node = self.node(parent)?;

        if child == parent {
            return Err(ParamError::CircularDependency {
                label: child_node.label.clone(),
            });
        }
        if child_node.parent().is_some() {
            return Err(ParamError::AlreadyAttached {
                label: child_node.label.clone(),
            });
        }

        // Label-based: any prospective ancestor carrying the child's label is
        // rejected, including ones in an unrelated branch that merely share it.
        let mut cursor = Some(parent);
        while let Some(ancestor_id) = cursor {
            let ancestor = self.node(ancestor_id)?;
            if ancestor.label == child_node.label {
                return Err(ParamError::DuplicateAncestorLabel {
                    label: child_node.label.clone(),
                    ancestor: ancestor.label.clone(),
                });
            }
            cursor = ancestor.parent();
        }

        let vertical = {
            let mut parent_link = parent_node.link.write();
            let mut child_link = child_node.link.write();

            parent_link.children.push(child);
            parent_link.level.horizontal += 1;
            child_link.parent = Some(parent);
            child_link.level.vertical = parent_link.level.vertical + 1;
            child_link.level.vertical
        };

        self.refresh_depths(&child_node, vertical)?;

        tracing::debug!(
            target: TARGET,
            child = %child_node.label,
            parent = %parent_node.label,
            depth = vertical,
            "attached category"
        );
        Ok(())
    }

    /// Make `child` a child of `parent`. Same checks as [`attach_parent`](Self::attach_parent).
    pub fn attach_child(&self, parent: CategoryId, child: CategoryId) -> Result<()> {
        self.attach_parent(child, parent)
    }

    /// Re-derive depth below a freshly attached subtree root.
    fn refresh_depths(&self, root: &CategoryNode, depth: u32) -> Result<()> {
        let mut frontier: VecDeque<(CategoryId, u32)> =
            root.children().into_iter().map(|c| (c, depth + 1)).collect();

        while let Some((id, vertical)) = frontier.pop_front() {
            let node = self.node(id)?;
            let children = {
                let mut link = node.link.write();
                link.level.vertical = vertical;
                link.children.clone()
            };
            frontier.extend(children.into_iter().map(|c| (c, vertical + 1)));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Ancestry
    // ---------------------------------------------------------------------

    /// Ancestors from the immediate parent up to the root. Empty for a root.
    pub fn ancestors(&self, id: CategoryId) -> Result<Vec<CategoryId>> {
        let mut chain = Vec::new();
        let mut cursor = self.node(id)?.parent();

        while let Some(ancestor) = cursor {
            chain.push(ancestor);
            cursor = self.node(ancestor)?.parent();
        }

        Ok(chain)
    }

    /// Items visible from `id`: its own items merged over every ancestor's.
    ///
    /// On a label collision the closer category wins, so a leaf's item shadows
    /// a same-labeled item anywhere above it.
    pub fn ancestor_items(&self, id: CategoryId) -> Result<HashMap<String, Arc<ParameterItem>>> {
        let mut chain = vec![id];
        chain.extend(self.ancestors(id)?);

        let mut merged = HashMap::new();
        for category in chain.into_iter().rev() {
            let node = self.node(category)?;
            for (label, item) in node.items.read().iter() {
                merged.insert(label.clone(), Arc::clone(item));
            }
        }
        Ok(merged)
    }
}

impl Default for CategoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CategoryTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryTree")
            .field("categories", &self.len())
            .finish()
    }
}
