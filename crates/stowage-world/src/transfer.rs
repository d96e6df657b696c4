//! Atomic item movement between containers.
//!
//! A transfer moves `min(requested, available)` units of one stack from a
//! source container to a destination, or nothing at all. Destinations that
//! cannot take the whole effective quantity reject the transfer before any
//! unit leaves the source.

use stowage_types::{ContainerRef, ItemId, Position};
use tracing::{debug, info};

use crate::error::WorldError;
use crate::world::World;

/// Outcome of a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Id the moved units live under at the destination.
    pub item: ItemId,
    /// Units actually moved. Zero when the source stack was already empty.
    pub count: u32,
    /// Where the units ended up.
    pub destination: ContainerRef,
}

/// The container-transfer primitive.
pub trait ContainerTransfer {
    /// Move up to `quantity` units of `item` from `source` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ItemNotInContainer`] if the source does not hold
    /// the item, [`WorldError::DestinationFull`] if the destination cannot
    /// take every unit, or [`WorldError::SameContainer`].
    fn transfer(
        &mut self,
        item: ItemId,
        source: ContainerRef,
        destination: ContainerRef,
        quantity: u32,
    ) -> Result<TransferReceipt, WorldError>;

    /// Drop up to `quantity` units of `item` on the nearest passable tile to
    /// `near`. Definitions marked destroy-on-drop are discarded instead.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ItemNotInContainer`] or [`WorldError::NoDropSpot`].
    fn try_drop_near(
        &mut self,
        item: ItemId,
        source: ContainerRef,
        near: Position,
        quantity: u32,
    ) -> Result<TransferReceipt, WorldError>;
}

impl ContainerTransfer for World {
    fn transfer(
        &mut self,
        item: ItemId,
        source: ContainerRef,
        destination: ContainerRef,
        quantity: u32,
    ) -> Result<TransferReceipt, WorldError> {
        if source == destination {
            return Err(WorldError::SameContainer(source));
        }
        let not_found = WorldError::ItemNotInContainer {
            item,
            container: source,
        };
        let stack = self
            .container(source)
            .and_then(|c| c.get(item))
            .ok_or(not_found)?;
        let moved = quantity.min(stack.count);
        let key = stack.key.clone();

        let accepts = self.accepts(destination, &key)?;
        if accepts < moved {
            return Err(WorldError::DestinationFull {
                container: destination,
                requested: moved,
                accepts,
            });
        }
        let Some(taken) = self.container_mut(source)?.take(item, moved)? else {
            return Err(WorldError::ItemNotInContainer {
                item,
                container: source,
            });
        };
        let count = taken.count;
        let landed = self.container_mut(destination)?.absorb(taken)?;
        if let ContainerRef::Ground(pos) = source {
            self.prune_ground(pos);
        }

        debug!(
            %item,
            landed = %landed,
            ?source,
            ?destination,
            count,
            "transferred items"
        );
        Ok(TransferReceipt {
            item: landed,
            count,
            destination,
        })
    }

    fn try_drop_near(
        &mut self,
        item: ItemId,
        source: ContainerRef,
        near: Position,
        quantity: u32,
    ) -> Result<TransferReceipt, WorldError> {
        let stack = self
            .container(source)
            .and_then(|c| c.get(item))
            .ok_or(WorldError::ItemNotInContainer {
                item,
                container: source,
            })?;
        let destroy = self
            .catalog()
            .get(&stack.key.def)
            .is_some_and(|def| def.destroy_on_drop);
        let spot = self
            .grid()
            .nearest_passable(near)
            .ok_or(WorldError::NoDropSpot(near))?;

        if destroy {
            let moved = quantity.min(stack.count);
            let taken = self.container_mut(source)?.take(item, moved)?;
            let count = taken.map_or(0, |s| s.count);
            info!(%item, count, "item destroyed on drop");
            return Ok(TransferReceipt {
                item,
                count,
                destination: ContainerRef::Ground(spot),
            });
        }

        let receipt = self.transfer(item, source, ContainerRef::Ground(spot), quantity)?;
        info!(%item, position = %spot, count = receipt.count, "dropped items on the ground");
        Ok(receipt)
    }
}
