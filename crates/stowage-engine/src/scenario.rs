//! Seeded demo world for the engine binary.
//!
//! Lays out a walled grid with storage cells, spawns agents holding random
//! stacks, gives each a two-state loadout, and issues one unload task per
//! agent. The same seed always produces the same world.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stowage_agents::{AgentManager, AgentProfile, ItemFilter, Loadout, LoadoutItem, LoadoutState};
use stowage_core::{SimulationConfig, UnloadTask};
use stowage_types::{AgentId, ItemCategory, ItemDef, ItemKey, ItemStack, Position, StoragePriority};
use stowage_world::{Grid, ItemCatalog, World};
use tracing::{debug, info};

use crate::error::EngineError;

/// Names handed out to demo agents, in order.
const NAME_POOL: &[&str] = &[
    "Alder", "Birch", "Cedar", "Dusk", "Ember", "Fern", "Grove", "Haze", "Iris", "Juniper",
    "Kestrel", "Lark", "Moss", "Nettle", "Oak", "Pine",
];

/// Carry capacity every demo agent starts with.
const CARRY_CAPACITY: Decimal = dec!(35);

/// A populated world ready to hand to the runner.
#[derive(Debug)]
pub struct DemoWorld {
    /// The world with walls, cells, agents and their items.
    pub world: World,
    /// Agent profiles and loadouts.
    pub agents: AgentManager,
    /// One unload task per agent.
    pub tasks: Vec<UnloadTask>,
}

fn demo_catalog() -> Result<ItemCatalog, EngineError> {
    let mut catalog = ItemCatalog::new();
    for def in [
        ItemDef::new("steel", ItemCategory::Resource, dec!(0.5), 75),
        ItemDef::new("wood", ItemCategory::Resource, dec!(0.4), 75),
        ItemDef::new("components", ItemCategory::Resource, dec!(0.6), 25),
        ItemDef::new("packaged_meal", ItemCategory::Food, dec!(0.3), 10),
        ItemDef::new("herbal_medicine", ItemCategory::Medicine, dec!(0.35), 25),
        ItemDef::new("knife", ItemCategory::MeleeWeapon, dec!(0.8), 1),
    ] {
        catalog.insert(def)?;
    }
    Ok(catalog)
}

fn demo_loadout() -> Loadout {
    let mut loadout = Loadout::new();
    loadout.insert_state(
        LoadoutState::new("work")
            .with_item(LoadoutItem::new(ItemFilter::any_of("packaged_meal"), 2))
            .with_item(LoadoutItem::new(ItemFilter::any_of("herbal_medicine"), 1)),
    );
    loadout.insert_state(
        LoadoutState::new("caravan")
            .with_item(LoadoutItem::new(ItemFilter::any_of("packaged_meal"), 8))
            .with_item(LoadoutItem::new(ItemFilter::any_of("herbal_medicine"), 4))
            .with_item(LoadoutItem::new(ItemFilter::any_of("knife"), 1)),
    );
    loadout
}

fn scenario_error(message: &str) -> EngineError {
    EngineError::Scenario {
        message: message.to_owned(),
    }
}

/// Build the demo world described by `config`.
///
/// # Errors
///
/// Returns [`EngineError::Scenario`] if the grid has too few open tiles for
/// the requested cells and agents, or a wrapped world/agent error.
pub fn build_demo_world(config: &SimulationConfig) -> Result<DemoWorld, EngineError> {
    let mut rng = StdRng::seed_from_u64(config.world.seed);
    let catalog = demo_catalog()?;
    let defs: Vec<ItemDef> = catalog.defs().cloned().collect();

    let mut grid = Grid::new(config.world.width, config.world.height);
    let density = config.world.wall_density_percent.min(60);
    let mut open = Vec::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let pos = Position::new(x, y);
            if rng.random_range(0..100) < density {
                grid.add_wall(pos);
            } else {
                open.push(pos);
            }
        }
    }
    open.shuffle(&mut rng);
    debug!(open = open.len(), "walls laid out");

    let cell_count = usize::try_from(config.world.storage_cells).unwrap_or(usize::MAX);
    let agent_count = usize::try_from(config.agents.count)
        .unwrap_or(usize::MAX)
        .min(NAME_POOL.len());
    if open.len() < cell_count.saturating_add(agent_count) {
        return Err(scenario_error("not enough open tiles for cells and agents"));
    }
    let mut spots = open.into_iter();

    let mut world = World::new(grid, catalog);
    let priorities = [
        StoragePriority::Low,
        StoragePriority::Normal,
        StoragePriority::Preferred,
        StoragePriority::Important,
    ];
    let allowed = BTreeSet::from([
        ItemCategory::Resource,
        ItemCategory::Food,
        ItemCategory::Medicine,
        ItemCategory::MeleeWeapon,
    ]);
    for _ in 0..cell_count {
        let pos = spots.next().ok_or_else(|| scenario_error("ran out of open tiles"))?;
        let priority = priorities
            .choose(&mut rng)
            .copied()
            .unwrap_or(StoragePriority::Normal);
        world.add_cell(pos, priority, allowed.clone())?;
    }

    let mut agents = AgentManager::new();
    let mut tasks = Vec::with_capacity(agent_count);
    for name in NAME_POOL.iter().take(agent_count) {
        let pos = spots.next().ok_or_else(|| scenario_error("ran out of open tiles"))?;
        let agent = agents.register(AgentProfile::new(name, CARRY_CAPACITY))?;
        world.add_agent(agent, pos)?;
        give_random_items(&mut world, &mut rng, &defs, agent, config.agents.items_per_agent)?;
        agents.assign_loadout(agent, demo_loadout())?;
        tasks.push(UnloadTask::create(agent, None, None, &world));
    }

    info!(
        width = config.world.width,
        height = config.world.height,
        cells = cell_count,
        agents = agents.len(),
        "Demo world built"
    );
    Ok(DemoWorld {
        world,
        agents,
        tasks,
    })
}

fn give_random_items(
    world: &mut World,
    rng: &mut StdRng,
    defs: &[ItemDef],
    agent: AgentId,
    stacks: u32,
) -> Result<(), EngineError> {
    for _ in 0..stacks {
        let Some(def) = defs.choose(rng) else {
            return Ok(());
        };
        let count = rng.random_range(1..=def.stack_limit.clamp(1, 20));
        world.give_inventory(agent, ItemStack::new(ItemKey::plain(&def.name), count))?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.width = 12;
        config.world.height = 8;
        config.world.storage_cells = 4;
        config.agents.count = 3;
        config.agents.items_per_agent = 2;
        config
    }

    #[test]
    fn builds_requested_population() {
        let demo = build_demo_world(&small_config()).unwrap();
        assert_eq!(demo.agents.len(), 3);
        assert_eq!(demo.tasks.len(), 3);
        assert_eq!(demo.world.cells().count(), 4);
        for agent in demo.agents.ids() {
            assert!(demo.world.position_of(agent).is_some());
            assert!(!demo.world.holdings(agent).unwrap().inventory.is_empty());
            assert_eq!(
                demo.agents.get_active_state(agent).map(|s| s.name.as_str()),
                Some("work")
            );
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let a = build_demo_world(&small_config()).unwrap();
        let b = build_demo_world(&small_config()).unwrap();
        let cells = |demo: &DemoWorld| -> BTreeSet<Position> {
            demo.world.cells().map(|c| c.position).collect()
        };
        assert_eq!(cells(&a), cells(&b));
        assert_eq!(a.world.grid(), b.world.grid());
    }

    #[test]
    fn rejects_overfull_grid() {
        let mut config = small_config();
        config.world.width = 2;
        config.world.height = 2;
        config.world.storage_cells = 10;
        assert!(matches!(
            build_demo_world(&config),
            Err(EngineError::Scenario { .. })
        ));
    }
}
