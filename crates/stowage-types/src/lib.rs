//! Shared type definitions for the Stowage simulation.
//!
//! This crate is the single source of truth for the data that flows
//! between the world, the agents, and the unload task machinery.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Item categories, quality, capacities, priorities, step outcomes
//! - [`structs`] -- Positions, item definitions and stacks, container addresses

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    Capacity, ItemCategory, PathEndMode, QualityCategory, StepStatus, StoragePriority,
};
pub use ids::{AgentId, CellId, ItemId};
pub use structs::{ContainerRef, ItemDef, ItemKey, ItemStack, Position, Unloadable};
