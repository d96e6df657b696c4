//! Error types for the stowage-agents crate.
//!
//! Agent bookkeeping, loadout management, and encumbrance calculations
//! return these instead of panicking.

use stowage_types::AgentId;
use stowage_world::WorldError;

/// Errors that can occur during agent operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Agent with the given ID was not found in the manager.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// An agent with this ID is already registered.
    #[error("duplicate agent id: {0}")]
    DuplicateAgent(AgentId),

    /// Agent name already exists in the manager.
    #[error("duplicate agent name: {0}")]
    DuplicateName(String),

    /// The agent cannot hold a loadout (not a colonist, dead, and so on).
    #[error("agent {0} is not a valid loadout holder")]
    NotLoadoutHolder(AgentId),

    /// The agent has no loadout assigned.
    #[error("agent {0} has no loadout")]
    NoLoadout(AgentId),

    /// The loadout has no state with that name.
    #[error("loadout of agent {agent} has no state named {state}")]
    UnknownLoadoutState {
        /// The agent whose loadout was searched.
        agent: AgentId,
        /// The missing state name.
        state: String,
    },

    /// The agent cannot carry anything, so encumbrance is unbounded.
    #[error("agent {0} has zero carry capacity")]
    NoCarryCapacity(AgentId),

    /// An arithmetic overflow occurred during a mass computation.
    #[error("arithmetic overflow in mass computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A world lookup failed.
    #[error(transparent)]
    World(#[from] WorldError),
}
