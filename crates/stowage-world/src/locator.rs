//! Storage-cell search.
//!
//! The locator answers "where should this stack go?" It only ever offers
//! cells that are unclaimed (or claimed by the asking agent), have room for
//! the stack's key, and can be reached from where the agent stands.

use std::cmp::Reverse;

use stowage_types::{AgentId, CellId, ItemId, PathEndMode, StoragePriority};
use tracing::debug;

use crate::reservation::{ReservationManager, Resource};
use crate::world::World;

/// Finds a destination storage cell for an item an agent holds.
pub trait StorageLocator {
    /// Best cell for `item` as held by `agent`, or `None`.
    ///
    /// With `desperate` set, low-priority cells are also considered.
    fn find(
        &self,
        world: &World,
        reservations: &ReservationManager,
        item: ItemId,
        agent: AgentId,
        desperate: bool,
    ) -> Option<CellId>;
}

/// Picks the highest-priority, then nearest, valid cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestStorageLocator;

impl StorageLocator for NearestStorageLocator {
    fn find(
        &self,
        world: &World,
        reservations: &ReservationManager,
        item: ItemId,
        agent: AgentId,
        desperate: bool,
    ) -> Option<CellId> {
        let stack = world
            .held_stack(agent, item)
            .or_else(|| world.carried(agent).filter(|s| s.id == item))?;
        let def = world.catalog().get(&stack.key.def)?;
        if !def.storable {
            return None;
        }
        let origin = world.position_of(agent)?;

        let mut candidates: Vec<(Reverse<StoragePriority>, u32, CellId)> = world
            .cells()
            .filter(|cell| desperate || cell.priority > StoragePriority::Low)
            .filter(|cell| cell.remaining_capacity(&stack.key, def) > 0)
            .filter(|cell| reservations.can_reserve(agent, Resource::Cell(cell.id)))
            .filter_map(|cell| {
                let distance = world
                    .grid()
                    .path_distance(origin, cell.position, PathEndMode::Touch)?;
                Some((Reverse(cell.priority), distance, cell.id))
            })
            .collect();
        candidates.sort_unstable();

        let found = candidates.first().map(|&(_, _, id)| id);
        debug!(
            %agent,
            %item,
            desperate,
            candidates = candidates.len(),
            found = ?found,
            "storage search"
        );
        found
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal_macros::dec;
    use stowage_types::{ItemCategory, ItemDef, ItemKey, ItemStack, Position};

    use super::*;
    use crate::catalog::ItemCatalog;
    use crate::grid::Grid;

    struct Fixture {
        world: World,
        reservations: ReservationManager,
        agent: AgentId,
        item: ItemId,
    }

    fn fixture() -> Fixture {
        let mut catalog = ItemCatalog::new();
        catalog
            .insert(ItemDef::new("steel", ItemCategory::Resource, dec!(0.5), 10))
            .unwrap();
        let mut world = World::new(Grid::new(10, 10), catalog);
        let agent = AgentId::new();
        world.add_agent(agent, Position::new(0, 0)).unwrap();
        let item = world
            .give_inventory(agent, ItemStack::new(ItemKey::plain("steel"), 5))
            .unwrap();
        Fixture {
            world,
            reservations: ReservationManager::new(),
            agent,
            item,
        }
    }

    fn resources() -> BTreeSet<ItemCategory> {
        BTreeSet::from([ItemCategory::Resource])
    }

    #[test]
    fn prefers_higher_priority_over_distance() {
        let mut f = fixture();
        f.world
            .add_cell(Position::new(1, 0), StoragePriority::Normal, resources())
            .unwrap();
        let far = f
            .world
            .add_cell(Position::new(9, 9), StoragePriority::Important, resources())
            .unwrap();
        let found = NearestStorageLocator.find(&f.world, &f.reservations, f.item, f.agent, false);
        assert_eq!(found, Some(far));
    }

    #[test]
    fn ties_break_on_distance() {
        let mut f = fixture();
        let near = f
            .world
            .add_cell(Position::new(2, 0), StoragePriority::Normal, resources())
            .unwrap();
        f.world
            .add_cell(Position::new(7, 0), StoragePriority::Normal, resources())
            .unwrap();
        let found = NearestStorageLocator.find(&f.world, &f.reservations, f.item, f.agent, false);
        assert_eq!(found, Some(near));
    }

    #[test]
    fn low_priority_only_when_desperate() {
        let mut f = fixture();
        let low = f
            .world
            .add_cell(Position::new(3, 3), StoragePriority::Low, resources())
            .unwrap();
        assert_eq!(
            NearestStorageLocator.find(&f.world, &f.reservations, f.item, f.agent, false),
            None
        );
        assert_eq!(
            NearestStorageLocator.find(&f.world, &f.reservations, f.item, f.agent, true),
            Some(low)
        );
    }

    #[test]
    fn skips_cells_claimed_by_others() {
        let mut f = fixture();
        let cell = f
            .world
            .add_cell(Position::new(3, 3), StoragePriority::Normal, resources())
            .unwrap();
        let rival = AgentId::new();
        assert!(f.reservations.reserve(rival, Resource::Cell(cell)));
        assert_eq!(
            NearestStorageLocator.find(&f.world, &f.reservations, f.item, f.agent, true),
            None
        );
        assert!(f.reservations.release(rival, Resource::Cell(cell)));
        assert!(f.reservations.reserve(f.agent, Resource::Cell(cell)));
        assert_eq!(
            NearestStorageLocator.find(&f.world, &f.reservations, f.item, f.agent, true),
            Some(cell)
        );
    }

    #[test]
    fn skips_filtered_full_and_unreachable_cells() {
        let mut f = fixture();
        f.world
            .add_cell(
                Position::new(1, 1),
                StoragePriority::Critical,
                BTreeSet::from([ItemCategory::Food]),
            )
            .unwrap();
        let full = f
            .world
            .add_cell(Position::new(2, 2), StoragePriority::Critical, resources())
            .unwrap();
        f.world
            .cell_mut(full)
            .unwrap()
            .contents
            .absorb(ItemStack::new(ItemKey::plain("steel"), 10))
            .unwrap();
        f.world
            .add_cell(Position::new(8, 8), StoragePriority::Critical, resources())
            .unwrap();
        for pos in Position::new(8, 8).neighbors() {
            f.world.grid_mut().add_wall(pos);
        }
        assert_eq!(
            NearestStorageLocator.find(&f.world, &f.reservations, f.item, f.agent, true),
            None
        );
    }
}
