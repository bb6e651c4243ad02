//! # Category Tree
//!
//! The hierarchy engine. Categories live in an arena ([`CategoryTree`]) and
//! refer to each other through [`CategoryId`] handles.
//!
//! ## Rules
//!
//! - A category is created as a root and gains a parent at most once.
//! - A category cannot be its own parent.
//! - A category's label may not match any label on its prospective ancestor
//!   chain. The comparison is by label, so two unrelated categories that
//!   happen to share a label cannot be stacked.
//! - `vertical` level is depth from the root (root = 1); `horizontal` counts
//!   attached children.
//! - Items resolve bottom-up: the closest category holding a label wins.
//!
//! ## Modules
//!
//! - `node`: ids, levels and per-node storage
//! - `arena`: creation, items, edges, ancestry
//! - `traversal`: depth-first and breadth-first search
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use paramtree_core::{CategoryTree, ParameterItem, ParamValue};
//!
//! let tree = CategoryTree::new();
//! let company = tree.create_category("Company", "root").unwrap();
//! let engineering = tree.create_category("Engineering", "eng").unwrap();
//! tree.attach_parent(engineering, company).unwrap();
//!
//! let budget = ParameterItem::new("budget", ParamValue::from(500), true).unwrap();
//! tree.add_item(company, Arc::new(budget)).unwrap();
//!
//! let visible = tree.ancestor_items(engineering).unwrap();
//! assert_eq!(visible["budget"].value(), &ParamValue::from(500));
//! assert_eq!(tree.ancestors(engineering).unwrap(), vec![company]);
//! ```

mod arena;
mod node;
mod traversal;

pub use arena::CategoryTree;
pub use node::{CategoryId, Level};
pub use traversal::{CategoryView, TraversalOrder};
