//! Predicate-filtered walks over a category subtree.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::arena::CategoryTree;
use super::node::{CategoryId, CategoryNode, Level};

/// Read-only view of a category handed to traversal predicates.
pub struct CategoryView<'a> {
    id: CategoryId,
    node: &'a CategoryNode,
}

impl<'a> CategoryView<'a> {
    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn label(&self) -> &'a str {
        &self.node.label
    }

    pub fn description(&self) -> &'a str {
        &self.node.description
    }

    pub fn level(&self) -> Level {
        self.node.link.read().level
    }

    pub fn parent(&self) -> Option<CategoryId> {
        self.node.parent()
    }

    pub fn child_count(&self) -> usize {
        self.node.link.read().children.len()
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    pub fn is_leaf(&self) -> bool {
        let link = self.node.link.read();
        link.parent.is_some() && link.children.is_empty()
    }

    pub fn has_item(&self, label: &str) -> bool {
        self.node.items.read().contains_key(label)
    }
}

/// Order in which a subtree is visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    #[default]
    DepthFirst,
    BreadthFirst,
}

impl CategoryTree {
    /// Pre-order walk from `root`, children in attachment order, collecting
    /// every category that satisfies `predicate`.
    pub fn depth_first_search<F>(
        &self,
        root: CategoryId,
        mut predicate: F,
    ) -> Result<Vec<CategoryId>>
    where
        F: FnMut(&CategoryView<'_>) -> bool,
    {
        let mut matches = Vec::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            if predicate(&CategoryView { id, node: &node }) {
                matches.push(id);
            }
            // reversed so the first child is popped first
            stack.extend(node.children().into_iter().rev());
        }

        Ok(matches)
    }

    /// Level-order walk from `root`: every category at depth d before any at
    /// depth d + 1.
    pub fn breadth_first_search<F>(
        &self,
        root: CategoryId,
        mut predicate: F,
    ) -> Result<Vec<CategoryId>>
    where
        F: FnMut(&CategoryView<'_>) -> bool,
    {
        let mut matches = Vec::new();
        let mut frontier = VecDeque::from([root]);

        while let Some(id) = frontier.pop_front() {
            let node = self.node(id)?;
            if predicate(&CategoryView { id, node: &node }) {
                matches.push(id);
            }
            frontier.extend(node.children());
        }

        Ok(matches)
    }

    pub fn search<F>(
        &self,
        root: CategoryId,
        order: TraversalOrder,
        predicate: F,
    ) -> Result<Vec<CategoryId>>
    where
        F: FnMut(&CategoryView<'_>) -> bool,
    {
        match order {
            TraversalOrder::DepthFirst => self.depth_first_search(root, predicate),
            TraversalOrder::BreadthFirst => self.breadth_first_search(root, predicate),
        }
    }
}
