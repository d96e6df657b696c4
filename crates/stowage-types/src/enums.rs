//! Enumeration types for the Stowage simulation.
//!
//! Item categories and quality, agent capacities, storage priorities,
//! movement end modes, and the three caller-visible task step outcomes.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Item classification
// ---------------------------------------------------------------------------

/// Broad category of an item definition.
///
/// Storage filters and the catalog def lists are keyed on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    /// Raw and processed materials (wood, steel, cloth).
    Resource,
    /// Edible items.
    Food,
    /// Worn clothing and armor.
    Apparel,
    /// Melee weapons.
    MeleeWeapon,
    /// Ranged weapons.
    RangedWeapon,
    /// Medicine.
    Medicine,
    /// Recreational or combat drugs.
    Drug,
}

/// Quality grade carried by crafted items.
///
/// Ordered from worst to best so that comparisons read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityCategory {
    /// Lowest grade.
    Awful,
    /// Below average.
    Poor,
    /// Baseline grade.
    Normal,
    /// Above average.
    Good,
    /// Well above average.
    Excellent,
    /// Near the top of the ladder.
    Masterwork,
    /// Highest grade.
    Legendary,
}

impl QualityCategory {
    /// The next grade up. Saturates at [`QualityCategory::Legendary`].
    pub const fn next(self) -> Self {
        match self {
            Self::Awful => Self::Poor,
            Self::Poor => Self::Normal,
            Self::Normal => Self::Good,
            Self::Good => Self::Excellent,
            Self::Excellent => Self::Masterwork,
            Self::Masterwork | Self::Legendary => Self::Legendary,
        }
    }

    /// The next grade down. Saturates at [`QualityCategory::Awful`].
    pub const fn previous(self) -> Self {
        match self {
            Self::Legendary => Self::Masterwork,
            Self::Masterwork => Self::Excellent,
            Self::Excellent => Self::Good,
            Self::Good => Self::Normal,
            Self::Normal => Self::Poor,
            Self::Poor | Self::Awful => Self::Awful,
        }
    }
}

// ---------------------------------------------------------------------------
// Agents and movement
// ---------------------------------------------------------------------------

/// A bodily capacity an agent may or may not currently have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capacity {
    /// Can pick up and place objects.
    Manipulation,
    /// Can walk.
    Moving,
    /// Can see.
    Sight,
}

/// How close a mover must get to its target before it counts as arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathEndMode {
    /// Standing on the target tile.
    OnCell,
    /// Standing on or orthogonally adjacent to the target tile.
    Touch,
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Priority of a storage cell. Haulers prefer higher priorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StoragePriority {
    /// Only used by desperate searches.
    Low,
    /// Default priority for new stockpiles.
    Normal,
    /// Preferred over normal stockpiles.
    Preferred,
    /// Preferred over preferred stockpiles.
    Important,
    /// Highest priority.
    Critical,
}

// ---------------------------------------------------------------------------
// Task outcomes
// ---------------------------------------------------------------------------

/// Result of advancing a task by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepStatus {
    /// Not yet at a terminal state; call again next tick.
    InProgress,
    /// The task finished normally.
    Succeeded,
    /// The task could not proceed and has ended.
    Incompletable,
}

impl StepStatus {
    /// Whether the task has reached a terminal outcome.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Incompletable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_next_saturates() {
        assert_eq!(QualityCategory::Awful.next(), QualityCategory::Poor);
        assert_eq!(QualityCategory::Excellent.next(), QualityCategory::Masterwork);
        assert_eq!(QualityCategory::Masterwork.next(), QualityCategory::Legendary);
        assert_eq!(QualityCategory::Legendary.next(), QualityCategory::Legendary);
    }

    #[test]
    fn quality_previous_saturates() {
        assert_eq!(QualityCategory::Legendary.previous(), QualityCategory::Masterwork);
        assert_eq!(QualityCategory::Normal.previous(), QualityCategory::Poor);
        assert_eq!(QualityCategory::Poor.previous(), QualityCategory::Awful);
        assert_eq!(QualityCategory::Awful.previous(), QualityCategory::Awful);
    }

    #[test]
    fn storage_priority_ordering() {
        assert!(StoragePriority::Critical > StoragePriority::Important);
        assert!(StoragePriority::Normal > StoragePriority::Low);
    }

    #[test]
    fn only_outcomes_are_terminal() {
        assert!(!StepStatus::InProgress.is_terminal());
        assert!(StepStatus::Succeeded.is_terminal());
        assert!(StepStatus::Incompletable.is_terminal());
    }
}
