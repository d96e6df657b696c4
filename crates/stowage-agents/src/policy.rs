//! Unload policies and gear queries.
//!
//! An [`UnloadPolicy`] names the next stack an agent should put away. It
//! is a pure read: calling it twice without touching the world gives the
//! same answer.

use std::collections::BTreeSet;

use stowage_types::{AgentId, ItemId, ItemStack, PathEndMode, Position, Unloadable};
use stowage_world::{ReservationManager, Resource, World};

use crate::agent::AgentManager;
use crate::loadout::ItemFilter;

/// Decides which held item should leave an agent next.
pub trait UnloadPolicy {
    /// The next stack to unload and how many units, or `None`.
    fn next_unloadable(&self, world: &World, agent: AgentId) -> Option<Unloadable>;
}

/// Every inventory stack is surplus, at its full count.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnloadEverything;

impl UnloadPolicy for UnloadEverything {
    fn next_unloadable(&self, world: &World, agent: AgentId) -> Option<Unloadable> {
        world
            .holdings(agent)?
            .inventory
            .stacks()
            .iter()
            .find(|stack| stack.count > 0)
            .map(|stack| Unloadable {
                item: stack.id,
                count: stack.count,
            })
    }
}

/// Loadout policy: a stack is surplus when the agent holds more of its key
/// (inventory plus equipment) than the active state desires. Agents with no
/// active state keep everything.
impl UnloadPolicy for AgentManager {
    fn next_unloadable(&self, world: &World, agent: AgentId) -> Option<Unloadable> {
        let state = self.get_active_state(agent)?;
        let holdings = world.holdings(agent)?;
        holdings.inventory.stacks().iter().find_map(|stack| {
            let held = holdings
                .inventory
                .count_of(&stack.key)
                .saturating_add(holdings.equipment.count_of(&stack.key));
            let surplus = held.saturating_sub(state.desired_for(&stack.key));
            let count = surplus.min(stack.count);
            (count > 0).then_some(Unloadable {
                item: stack.id,
                count,
            })
        })
    }
}

/// Stacks in the agent's inventory followed by its equipment.
pub fn inventory_and_equipment(world: &World, agent: AgentId) -> Vec<&ItemStack> {
    world.holdings(agent).map_or_else(Vec::new, |h| {
        h.inventory
            .stacks()
            .iter()
            .chain(h.equipment.stacks())
            .collect()
    })
}

/// Worn apparel, then inventory, then equipment.
pub fn all_gear(world: &World, agent: AgentId) -> Vec<&ItemStack> {
    world.holdings(agent).map_or_else(Vec::new, |h| {
        h.apparel
            .stacks()
            .iter()
            .chain(h.inventory.stacks())
            .chain(h.equipment.stacks())
            .collect()
    })
}

/// Loose stacks the agent could go and fetch for a loadout line: the
/// filter allows them, they are not forbidden, nobody else has claimed
/// them, and the agent can reach them.
pub fn items_on_map_matching(
    world: &World,
    reservations: &ReservationManager,
    filter: &ItemFilter,
    agent: AgentId,
) -> Vec<(Position, ItemId)> {
    let Some(origin) = world.position_of(agent) else {
        return Vec::new();
    };
    let blocked = BTreeSet::new();
    world
        .ground_items()
        .filter(|(_, stack)| filter.allows(&stack.key))
        .filter(|(_, stack)| !stack.forbidden)
        .filter(|(_, stack)| reservations.can_reserve(agent, Resource::Item(stack.id)))
        .filter(|(pos, _)| {
            world
                .grid()
                .path_to(origin, *pos, PathEndMode::Touch, &blocked)
                .is_some()
        })
        .map(|(pos, stack)| (pos, stack.id))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use stowage_types::{ContainerRef, ItemKey};
    use stowage_world::{Grid, ItemCatalog};

    use super::*;
    use crate::agent::AgentProfile;
    use crate::loadout::{Loadout, LoadoutItem, LoadoutState};

    fn setup() -> (World, AgentManager, AgentId) {
        let mut manager = AgentManager::new();
        let agent = manager.register(AgentProfile::new("Ada", dec!(35))).unwrap();
        let mut world = World::new(Grid::new(8, 8), ItemCatalog::new());
        world.add_agent(agent, Position::new(0, 0)).unwrap();
        (world, manager, agent)
    }

    fn keep_meals(count: u32) -> Loadout {
        let mut loadout = Loadout::new();
        loadout.insert_state(
            LoadoutState::new("work").with_item(LoadoutItem::new(ItemFilter::any_of("meal"), count)),
        );
        loadout
    }

    #[test]
    fn unload_everything_returns_first_stack_in_full() {
        let (mut world, _, agent) = setup();
        assert!(UnloadEverything.next_unloadable(&world, agent).is_none());
        let steel = world
            .give_inventory(agent, ItemStack::new(ItemKey::plain("steel"), 5))
            .unwrap();
        world
            .give_inventory(agent, ItemStack::new(ItemKey::plain("wood"), 2))
            .unwrap();
        let next = UnloadEverything.next_unloadable(&world, agent).unwrap();
        assert_eq!(next, Unloadable { item: steel, count: 5 });
    }

    #[test]
    fn loadout_policy_returns_only_surplus() {
        let (mut world, mut manager, agent) = setup();
        manager.assign_loadout(agent, keep_meals(3)).unwrap();
        let meals = world
            .give_inventory(agent, ItemStack::new(ItemKey::plain("meal"), 5))
            .unwrap();
        let next = manager.next_unloadable(&world, agent).unwrap();
        assert_eq!(next, Unloadable { item: meals, count: 2 });
    }

    #[test]
    fn loadout_policy_counts_equipment_toward_held() {
        let (mut world, mut manager, agent) = setup();
        manager.assign_loadout(agent, keep_meals(3)).unwrap();
        world
            .give_equipment(agent, ItemStack::new(ItemKey::plain("meal"), 3))
            .unwrap();
        let meals = world
            .give_inventory(agent, ItemStack::new(ItemKey::plain("meal"), 2))
            .unwrap();
        assert_eq!(
            manager.next_unloadable(&world, agent),
            Some(Unloadable { item: meals, count: 2 })
        );
    }

    #[test]
    fn loadout_policy_without_active_state_keeps_everything() {
        let (mut world, manager, agent) = setup();
        world
            .give_inventory(agent, ItemStack::new(ItemKey::plain("meal"), 5))
            .unwrap();
        assert!(manager.next_unloadable(&world, agent).is_none());
    }

    #[test]
    fn policy_is_idempotent() {
        let (mut world, mut manager, agent) = setup();
        manager.assign_loadout(agent, keep_meals(1)).unwrap();
        world
            .give_inventory(agent, ItemStack::new(ItemKey::plain("meal"), 4))
            .unwrap();
        world
            .give_inventory(agent, ItemStack::new(ItemKey::plain("steel"), 4))
            .unwrap();
        let first = manager.next_unloadable(&world, agent);
        assert_eq!(first, manager.next_unloadable(&world, agent));
        assert_eq!(
            UnloadEverything.next_unloadable(&world, agent),
            UnloadEverything.next_unloadable(&world, agent)
        );
    }

    #[test]
    fn gear_queries_cover_the_right_containers() {
        let (mut world, _, agent) = setup();
        world
            .give_apparel(agent, ItemStack::new(ItemKey::plain("parka"), 1))
            .unwrap();
        world
            .give_inventory(agent, ItemStack::new(ItemKey::plain("meal"), 2))
            .unwrap();
        world
            .give_equipment(agent, ItemStack::new(ItemKey::plain("rifle"), 1))
            .unwrap();
        let defs = |stacks: Vec<&ItemStack>| stacks.iter().map(|s| s.def().to_owned()).collect::<Vec<_>>();
        assert_eq!(defs(inventory_and_equipment(&world, agent)), ["meal", "rifle"]);
        assert_eq!(defs(all_gear(&world, agent)), ["parka", "meal", "rifle"]);
        assert!(all_gear(&world, AgentId::new()).is_empty());
    }

    #[test]
    fn map_matching_skips_forbidden_reserved_and_sealed() {
        let (mut world, _, agent) = setup();
        let mut reservations = ReservationManager::new();
        let open = world
            .place_on_ground(Position::new(3, 3), ItemStack::new(ItemKey::plain("meal"), 1))
            .unwrap();
        let forbidden = world
            .place_on_ground(Position::new(4, 4), ItemStack::new(ItemKey::plain("meal"), 1))
            .unwrap();
        world.set_forbidden(ContainerRef::Ground(Position::new(4, 4)), forbidden, true);
        let claimed = world
            .place_on_ground(Position::new(5, 5), ItemStack::new(ItemKey::plain("meal"), 1))
            .unwrap();
        assert!(reservations.reserve(AgentId::new(), Resource::Item(claimed)));
        world
            .place_on_ground(Position::new(7, 7), ItemStack::new(ItemKey::plain("meal"), 1))
            .unwrap();
        world.grid_mut().add_wall(Position::new(6, 7));
        world.grid_mut().add_wall(Position::new(7, 6));
        world
            .place_on_ground(Position::new(2, 2), ItemStack::new(ItemKey::plain("steel"), 1))
            .unwrap();

        let found = items_on_map_matching(&world, &reservations, &ItemFilter::any_of("meal"), agent);
        assert_eq!(found, vec![(Position::new(3, 3), open)]);
    }
}
