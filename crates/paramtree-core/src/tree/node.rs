use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use slotmap::new_key_type;

use crate::item::ParameterItem;

new_key_type! {
    /// Stable handle to a category inside a [`CategoryTree`](super::CategoryTree).
    ///
    /// Parent and child links store these handles rather than references, so
    /// the two-way edge never forms an ownership cycle.
    pub struct CategoryId;
}

impl CategoryId {
    /// Raw numeric form, for display and external tooling.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

/// Position of a category in the hierarchy.
///
/// `vertical` is the depth from the root (a root is 1). `horizontal` counts
/// how many children have been attached to this category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Level {
    pub(crate) horizontal: u32,
    pub(crate) vertical: u32,
}

impl Level {
    pub(crate) const ROOT: Level = Level {
        horizontal: 0,
        vertical: 1,
    };

    pub fn horizontal(&self) -> u32 {
        self.horizontal
    }

    pub fn vertical(&self) -> u32 {
        self.vertical
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::ROOT
    }
}

/// Tree links of a node, guarded together so an edge is never half-visible.
#[derive(Debug, Clone, Default)]
pub(crate) struct Link {
    pub(crate) parent: Option<CategoryId>,
    pub(crate) children: Vec<CategoryId>,
    pub(crate) level: Level,
}

pub(crate) type ItemMap = HashMap<String, Arc<ParameterItem>>;

/// Storage for one category.
#[derive(Debug)]
pub(crate) struct CategoryNode {
    pub(crate) label: String,
    pub(crate) description: String,
    pub(crate) items: RwLock<ItemMap>,
    pub(crate) link: RwLock<Link>,
}

impl CategoryNode {
    pub(crate) fn new(label: String, description: String) -> Self {
        Self {
            label,
            description,
            items: RwLock::new(HashMap::new()),
            link: RwLock::new(Link::default()),
        }
    }

    pub(crate) fn parent(&self) -> Option<CategoryId> {
        self.link.read().parent
    }

    /// Copy of the child list at the time of the call.
    pub(crate) fn children(&self) -> Vec<CategoryId> {
        self.link.read().children.clone()
    }
}
