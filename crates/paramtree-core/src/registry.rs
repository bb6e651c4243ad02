use crate::tree::CategoryId;

/// Flat record of categories created through a factory.
///
/// Independent of tree shape: order is insertion order and the same id may
/// appear more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryRegistry {
    categories: Vec<CategoryId>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: CategoryId) {
        self.categories.push(id);
    }

    /// Remove the first occurrence of `id`. Returns whether one was found.
    pub fn remove(&mut self, id: CategoryId) -> bool {
        match self.categories.iter().position(|c| *c == id) {
            Some(index) => {
                self.categories.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.categories.contains(&id)
    }

    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.categories.iter().copied()
    }
}
