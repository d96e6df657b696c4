//! Storage cells: stockpile tiles that hold a single item kind each.

use std::collections::BTreeSet;

use stowage_types::{CellId, ItemCategory, ItemDef, ItemKey, Position, StoragePriority};

use crate::container::Container;

/// A tile set aside for storage.
///
/// A cell holds at most one item key at a time, up to the definition's
/// stack limit. Which categories it accepts is set by its filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageCell {
    /// Cell identity.
    pub id: CellId,
    /// Tile the cell occupies.
    pub position: Position,
    /// Hauling priority.
    pub priority: StoragePriority,
    /// Categories this cell accepts.
    pub allowed: BTreeSet<ItemCategory>,
    /// Items currently stored.
    pub contents: Container,
}

impl StorageCell {
    /// Create an empty cell.
    pub fn new(
        position: Position,
        priority: StoragePriority,
        allowed: BTreeSet<ItemCategory>,
    ) -> Self {
        Self {
            id: CellId::new(),
            position,
            priority,
            allowed,
            contents: Container::new(),
        }
    }

    /// Whether the filter lets this category in.
    pub fn allows(&self, category: ItemCategory) -> bool {
        self.allowed.contains(&category)
    }

    /// Units of `key` the cell can still take.
    ///
    /// Zero if the filter rejects the definition or the cell already holds
    /// a different key.
    pub fn remaining_capacity(&self, key: &ItemKey, def: &ItemDef) -> u32 {
        if !self.allows(def.category) {
            return 0;
        }
        if self.contents.stacks().iter().any(|s| &s.key != key) {
            return 0;
        }
        def.stack_limit.saturating_sub(self.contents.count_of(key))
    }
}
