//! Point-in-time copies of a subtree for display.
//!
//! A snapshot holds no locks and no handles into the arena, so it can be
//! rendered or serialized while the tree keeps changing. Categories are stored
//! flat in pre-order and refer to each other by position, which keeps building,
//! rendering, serializing and dropping free of recursion however deep the
//! subtree is.

use serde::Serialize;

use crate::error::Result;
use crate::item::ParameterItem;
use crate::tree::{CategoryId, CategoryTree, Level};
use crate::value::ValueKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSnapshot {
    pub label: String,
    pub value: String,
    pub kind: ValueKind,
    pub active: bool,
}

impl From<&ParameterItem> for ItemSnapshot {
    fn from(item: &ParameterItem) -> Self {
        Self {
            label: item.label().to_string(),
            value: item.value().to_string(),
            kind: item.value().kind(),
            active: item.is_active(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySnapshot {
    pub id: u64,
    /// Position of the parent in [`TreeSnapshot::categories`]. `None` for the
    /// snapshot root, even when the root has a parent in the tree.
    pub parent: Option<usize>,
    pub label: String,
    pub description: String,
    pub level: Level,
    /// Own items, sorted by label.
    pub items: Vec<ItemSnapshot>,
    /// Positions of the children in [`TreeSnapshot::categories`], in
    /// attachment order.
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeSnapshot {
    /// Labels above the snapshot root, immediate parent first.
    pub ancestors: Vec<String>,
    /// Every category of the subtree in pre-order. The root comes first.
    pub categories: Vec<CategorySnapshot>,
}

impl TreeSnapshot {
    pub fn root(&self) -> Option<&CategorySnapshot> {
        self.categories.first()
    }

    /// Number of categories in the snapshot, root included.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Labels from the parent of the category at `index` up to the topmost
    /// ancestor of the tree.
    pub fn ancestors_of(&self, index: usize) -> Vec<&str> {
        let mut labels = Vec::new();
        let mut cursor = self.categories.get(index).and_then(|c| c.parent);
        while let Some(position) = cursor {
            let category = &self.categories[position];
            labels.push(category.label.as_str());
            cursor = category.parent;
        }
        labels.extend(self.ancestors.iter().map(String::as_str));
        labels
    }
}

impl CategoryTree {
    /// Copy the subtree under `root`.
    pub fn snapshot(&self, root: CategoryId) -> Result<TreeSnapshot> {
        let ancestors = self
            .ancestors(root)?
            .into_iter()
            .map(|id| self.label(id))
            .collect::<Result<Vec<_>>>()?;

        let mut categories: Vec<CategorySnapshot> = Vec::new();
        let mut stack: Vec<(CategoryId, Option<usize>)> = vec![(root, None)];

        while let Some((id, parent)) = stack.pop() {
            let node = self.node(id)?;
            let (level, children) = {
                let link = node.link.read();
                (link.level, link.children.clone())
            };

            let mut items: Vec<ItemSnapshot> = node
                .items
                .read()
                .values()
                .map(|item| ItemSnapshot::from(item.as_ref()))
                .collect();
            items.sort_by(|a, b| a.label.cmp(&b.label));

            let position = categories.len();
            if let Some(parent) = parent {
                categories[parent].children.push(position);
            }
            categories.push(CategorySnapshot {
                id: id.as_raw(),
                parent,
                label: node.label.clone(),
                description: node.description.clone(),
                level,
                items,
                children: Vec::new(),
            });

            // reversed so the first child is visited first
            stack.extend(children.into_iter().rev().map(|c| (c, Some(position))));
        }

        Ok(TreeSnapshot {
            ancestors,
            categories,
        })
    }
}

/// Render a snapshot as an indented org chart.
///
/// ```text
/// Company (v1 h1)
/// │  budget = 500
/// └── Engineering (v2 h0)
///        budget = 1000
/// ```
pub fn render_tree(snapshot: &TreeSnapshot) -> String {
    let mut out = String::new();
    if snapshot.is_empty() {
        return out;
    }

    // (position, body prefix, connector written before the heading)
    let mut stack: Vec<(usize, String, String)> = vec![(0, String::new(), String::new())];

    while let Some((position, prefix, connector)) = stack.pop() {
        let category = &snapshot.categories[position];
        out.push_str(&connector);
        out.push_str(&heading(category));
        out.push('\n');

        let rail = if category.children.is_empty() {
            "   "
        } else {
            "│  "
        };
        for item in &category.items {
            let marker = if item.active { "" } else { " (inactive)" };
            out.push_str(&format!(
                "{}{}{} = {}{}\n",
                prefix, rail, item.label, item.value, marker
            ));
        }

        let last = category.children.len().saturating_sub(1);
        for (i, child) in category.children.iter().enumerate().rev() {
            let (branch, next) = if i == last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            stack.push((
                *child,
                format!("{}{}", prefix, next),
                format!("{}{}", prefix, branch),
            ));
        }
    }

    out
}

fn heading(category: &CategorySnapshot) -> String {
    format!(
        "{} (v{} h{})",
        category.label,
        category.level.vertical(),
        category.level.horizontal()
    )
}
