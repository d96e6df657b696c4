//! Agent profiles, loadouts, and unload policies for the Stowage simulation.
//!
//! This crate decides *what* an agent wants to carry. It never moves items
//! itself; the task machinery in `stowage-core` asks an [`UnloadPolicy`]
//! what to put away and does the moving through the world.
//!
//! # Modules
//!
//! - [`agent`] -- [`AgentProfile`] and the [`AgentManager`] registry.
//! - [`encumbrance`] -- Hypothetical gear mass and encumbrance calculators.
//! - [`error`] -- Error types for agent operations ([`AgentError`]).
//! - [`loadout`] -- Loadouts, loadout states, and item filters.
//! - [`policy`] -- [`UnloadPolicy`] implementations and gear queries.

pub mod agent;
pub mod encumbrance;
pub mod error;
pub mod loadout;
pub mod policy;

// Re-export primary types at crate root for convenience.
pub use agent::{AgentManager, AgentProfile};
pub use encumbrance::{
    hypothetical_encumbrance, hypothetical_gear_mass, hypothetical_unbounded_encumbrance,
};
pub use error::AgentError;
pub use loadout::{ItemFilter, Loadout, LoadoutItem, LoadoutState, extend_set};
pub use policy::{
    UnloadEverything, UnloadPolicy, all_gear, inventory_and_equipment, items_on_map_matching,
};
