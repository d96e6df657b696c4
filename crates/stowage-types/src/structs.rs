//! Core entity structs for the Stowage simulation.
//!
//! Covers grid positions, item definitions and stacks, container
//! addressing, and the unload-policy result type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{ItemCategory, PathEndMode, QualityCategory};
use crate::ids::{AgentId, CellId, ItemId};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A tile coordinate on the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a position from its coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`, saturating at `u32::MAX`.
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Whether `self` satisfies `mode` with respect to `target`.
    pub const fn reached(self, target: Self, mode: PathEndMode) -> bool {
        let distance = self.manhattan_distance(target);
        match mode {
            PathEndMode::OnCell => distance == 0,
            PathEndMode::Touch => distance <= 1,
        }
    }

    /// The four orthogonal neighbors, skipping any that would overflow.
    pub fn neighbors(self) -> Vec<Self> {
        [
            self.y.checked_sub(1).map(|y| Self::new(self.x, y)),
            self.x.checked_add(1).map(|x| Self::new(x, self.y)),
            self.y.checked_add(1).map(|y| Self::new(self.x, y)),
            self.x.checked_sub(1).map(|x| Self::new(x, self.y)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Item definitions
// ---------------------------------------------------------------------------

/// Static per-kind data for an item definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Unique definition name (the item's kind).
    pub name: String,
    /// Broad category used by storage filters.
    pub category: ItemCategory,
    /// Mass of a single unit.
    pub mass: Decimal,
    /// Maximum units a single storage cell holds.
    pub stack_limit: u32,
    /// Whether items of this kind can ever be put in storage.
    pub storable: bool,
    /// Whether items of this kind can be hauled at all.
    pub haulable: bool,
    /// Whether the item is destroyed when dropped.
    pub destroy_on_drop: bool,
    /// Whether the player can ever own items of this kind.
    pub player_acquirable: bool,
    /// Construction frame placeholder.
    pub is_frame: bool,
    /// Half-finished crafting product.
    pub is_unfinished: bool,
    /// Packed-up furniture.
    pub is_minified: bool,
    /// Dead body.
    pub is_corpse: bool,
    /// Defined as a building rather than an item.
    pub is_building: bool,
}

impl ItemDef {
    /// Create an ordinary storable, haulable definition.
    pub fn new(name: &str, category: ItemCategory, mass: Decimal, stack_limit: u32) -> Self {
        Self {
            name: name.to_owned(),
            category,
            mass,
            stack_limit,
            storable: true,
            haulable: true,
            destroy_on_drop: false,
            player_acquirable: true,
            is_frame: false,
            is_unfinished: false,
            is_minified: false,
            is_corpse: false,
            is_building: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Item stacks
// ---------------------------------------------------------------------------

/// The fungibility key of an item: definition plus modifiers.
///
/// Two stacks with equal keys can merge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    /// Definition name.
    pub def: String,
    /// Material the item is made from, if any.
    pub stuff: Option<String>,
    /// Quality grade, if the definition has one.
    pub quality: Option<QualityCategory>,
}

impl ItemKey {
    /// Key for a plain definition with no modifiers.
    pub fn plain(def: &str) -> Self {
        Self {
            def: def.to_owned(),
            stuff: None,
            quality: None,
        }
    }
}

/// A quantity of one fungible item kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Identity of this stack.
    pub id: ItemId,
    /// Fungibility key.
    pub key: ItemKey,
    /// Number of units in the stack.
    pub count: u32,
    /// Forbidden stacks are ignored by other agents' hauling.
    pub forbidden: bool,
}

impl ItemStack {
    /// Create a new, unforbidden stack with a fresh id.
    pub fn new(key: ItemKey, count: u32) -> Self {
        Self {
            id: ItemId::new(),
            key,
            count,
            forbidden: false,
        }
    }

    /// Definition name of the stack.
    pub fn def(&self) -> &str {
        &self.key.def
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// Address of a container that can own item stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContainerRef {
    /// An agent's personal inventory.
    Inventory(AgentId),
    /// An agent's equipped items.
    Equipment(AgentId),
    /// An agent's single-stack hauling slot.
    CarrySlot(AgentId),
    /// A storage cell.
    Cell(CellId),
    /// Loose items on the ground at a tile.
    Ground(Position),
}

// ---------------------------------------------------------------------------
// Unload policy
// ---------------------------------------------------------------------------

/// An item an unload policy says should leave the agent, with how many units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unloadable {
    /// The stack to unload.
    pub item: ItemId,
    /// How many units to unload.
    pub count: u32,
}
