//! The fixed table of doodle categories the classifiers were trained on.

use crate::core::constants::NUM_CLASSES;

/// Category names in class-index order.
pub const DOODLE_CATEGORIES: [&str; NUM_CLASSES] = [
    "Clock",
    "Boomerang",
    "Airplane",
    "Snail",
    "Parachute",
    "Tree",
    "Fish",
    "Diamond",
    "Helicopter",
    "T-Shirt",
];

/// Immutable mapping from class index to category name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTable {
    names: &'static [&'static str],
}

impl CategoryTable {
    /// The ten doodle categories.
    pub const fn doodles() -> Self {
        Self {
            names: &DOODLE_CATEGORIES,
        }
    }

    /// Name of the category at `index`, if the index is valid.
    pub fn name(&self, index: usize) -> Option<&'static str> {
        self.names.get(index).copied()
    }

    /// Index of the category with the given name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|&n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over `(index, name)` pairs in class order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'static str)> + '_ {
        self.names.iter().copied().enumerate()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::doodles()
    }
}
