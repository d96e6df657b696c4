//! Error types for the `stowage-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type.

use stowage_types::{AgentId, CellId, ContainerRef, ItemId, Position};

/// Errors that can occur during world operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// An agent was not registered with the world.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// An agent was registered twice.
    #[error("duplicate agent id: {0}")]
    DuplicateAgent(AgentId),

    /// A storage cell was not found.
    #[error("storage cell not found: {0}")]
    CellNotFound(CellId),

    /// A storage cell already occupies the tile.
    #[error("a storage cell already exists at {0}")]
    DuplicateCell(Position),

    /// The tile is outside the grid or blocked.
    #[error("tile {0} is not passable")]
    Impassable(Position),

    /// No definition with that name is in the catalog.
    #[error("unknown item definition: {0}")]
    UnknownDef(String),

    /// A definition with that name is already in the catalog.
    #[error("duplicate item definition: {0}")]
    DuplicateDef(String),

    /// The item is not in the named container.
    #[error("item {item} is not in {container:?}")]
    ItemNotInContainer {
        /// The missing item.
        item: ItemId,
        /// The container that was searched.
        container: ContainerRef,
    },

    /// The destination cannot take the whole quantity.
    #[error("{container:?} accepts {accepts} but {requested} were requested")]
    DestinationFull {
        /// The destination container.
        container: ContainerRef,
        /// Units the caller tried to move.
        requested: u32,
        /// Units the destination can take.
        accepts: u32,
    },

    /// Source and destination are the same container.
    #[error("cannot transfer within {0:?}")]
    SameContainer(ContainerRef),

    /// No passable tile exists to drop an item on.
    #[error("no passable tile near {0}")]
    NoDropSpot(Position),

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in world calculation")]
    ArithmeticOverflow,
}
