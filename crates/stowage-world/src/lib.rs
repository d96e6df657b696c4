//! Grid, containers, storage, and reservations for the Stowage simulation.
//!
//! This crate owns every item in the world. Agents and tasks refer to items
//! and cells by id; units change owner only through [`ContainerTransfer`].
//!
//! # Modules
//!
//! - [`catalog`] -- Item definitions and the loadout def lists derived from them.
//! - [`container`] -- Ordered stack collections with split and merge semantics.
//! - [`error`] -- Error types for world operations.
//! - [`grid`] -- Tile grid with walls and BFS pathfinding.
//! - [`locator`] -- [`StorageLocator`] and the priority-then-distance
//!   [`NearestStorageLocator`].
//! - [`movement`] -- [`Mover`] and the tick-bounded [`GridMover`].
//! - [`reservation`] -- Exclusive advisory claims on cells, tiles, and items.
//! - [`storage`] -- Single-kind storage cells with category filters.
//! - [`transfer`] -- The atomic [`ContainerTransfer`] primitive.
//! - [`world`] -- [`World`]: the shared state every agent acts on.

pub mod catalog;
pub mod container;
pub mod error;
pub mod grid;
pub mod locator;
pub mod movement;
pub mod reservation;
pub mod storage;
pub mod transfer;
pub mod world;

// Re-export primary types at crate root.
pub use catalog::{DefLists, ItemCatalog};
pub use container::Container;
pub use error::WorldError;
pub use grid::Grid;
pub use locator::{NearestStorageLocator, StorageLocator};
pub use movement::{GridMover, MoveProgress, Mover};
pub use reservation::{ReservationManager, Resource};
pub use storage::StorageCell;
pub use transfer::{ContainerTransfer, TransferReceipt};
pub use world::{Holdings, World};
