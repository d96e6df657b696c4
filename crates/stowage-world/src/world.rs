//! The shared world state: grid, catalog, storage cells, ground items, and
//! every agent's containers and position.
//!
//! All item ownership lives here. Agents and tasks refer to items and cells
//! by id only; moving units between owners goes through
//! [`ContainerTransfer`](crate::transfer::ContainerTransfer).

use std::collections::{BTreeMap, BTreeSet};

use stowage_types::{
    AgentId, CellId, ContainerRef, ItemCategory, ItemId, ItemKey, ItemStack, Position,
    StoragePriority,
};

use crate::catalog::ItemCatalog;
use crate::container::Container;
use crate::error::WorldError;
use crate::grid::Grid;
use crate::storage::StorageCell;

/// Everything an agent physically holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Holdings {
    /// Personal inventory.
    pub inventory: Container,
    /// Equipped weapons and tools.
    pub equipment: Container,
    /// Worn apparel.
    pub apparel: Container,
    /// Single-stack hauling slot.
    pub carry: Container,
}

/// The simulated world.
#[derive(Debug, Clone)]
pub struct World {
    grid: Grid,
    catalog: ItemCatalog,
    cells: BTreeMap<CellId, StorageCell>,
    cell_index: BTreeMap<Position, CellId>,
    ground: BTreeMap<Position, Container>,
    holdings: BTreeMap<AgentId, Holdings>,
    positions: BTreeMap<AgentId, Position>,
}

impl World {
    /// Create a world with no agents, cells, or loose items.
    pub const fn new(grid: Grid, catalog: ItemCatalog) -> Self {
        Self {
            grid,
            catalog,
            cells: BTreeMap::new(),
            cell_index: BTreeMap::new(),
            ground: BTreeMap::new(),
            holdings: BTreeMap::new(),
            positions: BTreeMap::new(),
        }
    }

    /// The tile grid.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The tile grid, mutably (to add or remove walls).
    pub const fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// The item catalog.
    pub const fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    // -------------------------------------------------------------------
    // Agents
    // -------------------------------------------------------------------

    /// Register an agent standing on `position` with empty containers.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateAgent`] or [`WorldError::Impassable`].
    pub fn add_agent(&mut self, agent: AgentId, position: Position) -> Result<(), WorldError> {
        if self.holdings.contains_key(&agent) {
            return Err(WorldError::DuplicateAgent(agent));
        }
        if !self.grid.is_passable(position) {
            return Err(WorldError::Impassable(position));
        }
        self.holdings.insert(agent, Holdings::default());
        self.positions.insert(agent, position);
        Ok(())
    }

    /// Remove an agent, returning what it held.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AgentNotFound`] if the agent is unknown.
    pub fn remove_agent(&mut self, agent: AgentId) -> Result<Holdings, WorldError> {
        self.positions.remove(&agent);
        self.holdings
            .remove(&agent)
            .ok_or(WorldError::AgentNotFound(agent))
    }

    /// Every registered agent.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.holdings.keys().copied().collect()
    }

    /// Where the agent stands.
    pub fn position_of(&self, agent: AgentId) -> Option<Position> {
        self.positions.get(&agent).copied()
    }

    /// Move an agent to a passable tile.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AgentNotFound`] or [`WorldError::Impassable`].
    pub fn set_position(&mut self, agent: AgentId, position: Position) -> Result<(), WorldError> {
        if !self.grid.is_passable(position) {
            return Err(WorldError::Impassable(position));
        }
        let slot = self
            .positions
            .get_mut(&agent)
            .ok_or(WorldError::AgentNotFound(agent))?;
        *slot = position;
        Ok(())
    }

    /// An agent's containers.
    pub fn holdings(&self, agent: AgentId) -> Option<&Holdings> {
        self.holdings.get(&agent)
    }

    /// An agent's containers, mutably.
    pub fn holdings_mut(&mut self, agent: AgentId) -> Option<&mut Holdings> {
        self.holdings.get_mut(&agent)
    }

    /// Put a stack into an agent's inventory.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AgentNotFound`] or [`WorldError::ArithmeticOverflow`].
    pub fn give_inventory(&mut self, agent: AgentId, stack: ItemStack) -> Result<ItemId, WorldError> {
        self.container_mut(ContainerRef::Inventory(agent))?.absorb(stack)
    }

    /// Put a stack into an agent's equipment.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AgentNotFound`] or [`WorldError::ArithmeticOverflow`].
    pub fn give_equipment(&mut self, agent: AgentId, stack: ItemStack) -> Result<ItemId, WorldError> {
        self.container_mut(ContainerRef::Equipment(agent))?.absorb(stack)
    }

    /// Dress an agent in a piece of apparel.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AgentNotFound`] or [`WorldError::ArithmeticOverflow`].
    pub fn give_apparel(&mut self, agent: AgentId, stack: ItemStack) -> Result<ItemId, WorldError> {
        self.holdings
            .get_mut(&agent)
            .ok_or(WorldError::AgentNotFound(agent))?
            .apparel
            .absorb(stack)
    }

    /// Which of the agent's containers (inventory first, then equipment)
    /// holds `item`.
    pub fn find_held(&self, agent: AgentId, item: ItemId) -> Option<ContainerRef> {
        let holdings = self.holdings.get(&agent)?;
        if holdings.inventory.contains(item) {
            Some(ContainerRef::Inventory(agent))
        } else if holdings.equipment.contains(item) {
            Some(ContainerRef::Equipment(agent))
        } else {
            None
        }
    }

    /// The stack `item` if the agent holds it in inventory or equipment.
    pub fn held_stack(&self, agent: AgentId, item: ItemId) -> Option<&ItemStack> {
        let container = self.find_held(agent, item)?;
        self.container(container)?.get(item)
    }

    /// The stack sitting in the agent's carry slot, if any.
    pub fn carried(&self, agent: AgentId) -> Option<&ItemStack> {
        self.holdings.get(&agent)?.carry.stacks().first()
    }

    // -------------------------------------------------------------------
    // Storage cells and ground
    // -------------------------------------------------------------------

    /// Designate a passable tile as a storage cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Impassable`] or [`WorldError::DuplicateCell`].
    pub fn add_cell(
        &mut self,
        position: Position,
        priority: StoragePriority,
        allowed: BTreeSet<ItemCategory>,
    ) -> Result<CellId, WorldError> {
        if !self.grid.is_passable(position) {
            return Err(WorldError::Impassable(position));
        }
        if self.cell_index.contains_key(&position) {
            return Err(WorldError::DuplicateCell(position));
        }
        let cell = StorageCell::new(position, priority, allowed);
        let id = cell.id;
        self.cell_index.insert(position, id);
        self.cells.insert(id, cell);
        Ok(id)
    }

    /// Look up a storage cell.
    pub fn cell(&self, id: CellId) -> Option<&StorageCell> {
        self.cells.get(&id)
    }

    /// Look up a storage cell, mutably.
    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut StorageCell> {
        self.cells.get_mut(&id)
    }

    /// The storage cell on a tile, if any.
    pub fn cell_at(&self, position: Position) -> Option<&StorageCell> {
        self.cells.get(self.cell_index.get(&position)?)
    }

    /// Every storage cell in id order.
    pub fn cells(&self) -> impl Iterator<Item = &StorageCell> {
        self.cells.values()
    }

    /// Drop a stack on a tile (scenario setup; does not search for space).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Impassable`] or [`WorldError::ArithmeticOverflow`].
    pub fn place_on_ground(&mut self, position: Position, stack: ItemStack) -> Result<ItemId, WorldError> {
        self.container_mut(ContainerRef::Ground(position))?.absorb(stack)
    }

    /// Loose stacks on one tile.
    pub fn ground_at(&self, position: Position) -> Option<&Container> {
        self.ground.get(&position)
    }

    /// Every loose stack with the tile it lies on.
    pub fn ground_items(&self) -> impl Iterator<Item = (Position, &ItemStack)> {
        self.ground
            .iter()
            .flat_map(|(pos, container)| container.stacks().iter().map(move |s| (*pos, s)))
    }

    /// Total units of `key` lying on the ground anywhere.
    pub fn ground_count_of(&self, key: &ItemKey) -> u32 {
        self.ground
            .values()
            .fold(0_u32, |acc, c| acc.saturating_add(c.count_of(key)))
    }

    // -------------------------------------------------------------------
    // Container addressing
    // -------------------------------------------------------------------

    /// Resolve a container address.
    pub fn container(&self, container: ContainerRef) -> Option<&Container> {
        match container {
            ContainerRef::Inventory(agent) => self.holdings.get(&agent).map(|h| &h.inventory),
            ContainerRef::Equipment(agent) => self.holdings.get(&agent).map(|h| &h.equipment),
            ContainerRef::CarrySlot(agent) => self.holdings.get(&agent).map(|h| &h.carry),
            ContainerRef::Cell(id) => self.cells.get(&id).map(|c| &c.contents),
            ContainerRef::Ground(pos) => self.ground.get(&pos),
        }
    }

    /// Resolve a container address mutably, creating ground piles on demand.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AgentNotFound`], [`WorldError::CellNotFound`],
    /// or [`WorldError::Impassable`] for ground outside the walkable area.
    pub fn container_mut(&mut self, container: ContainerRef) -> Result<&mut Container, WorldError> {
        match container {
            ContainerRef::Inventory(agent) => self
                .holdings
                .get_mut(&agent)
                .map(|h| &mut h.inventory)
                .ok_or(WorldError::AgentNotFound(agent)),
            ContainerRef::Equipment(agent) => self
                .holdings
                .get_mut(&agent)
                .map(|h| &mut h.equipment)
                .ok_or(WorldError::AgentNotFound(agent)),
            ContainerRef::CarrySlot(agent) => self
                .holdings
                .get_mut(&agent)
                .map(|h| &mut h.carry)
                .ok_or(WorldError::AgentNotFound(agent)),
            ContainerRef::Cell(id) => self
                .cells
                .get_mut(&id)
                .map(|c| &mut c.contents)
                .ok_or(WorldError::CellNotFound(id)),
            ContainerRef::Ground(pos) => {
                if !self.grid.is_passable(pos) {
                    return Err(WorldError::Impassable(pos));
                }
                Ok(self.ground.entry(pos).or_default())
            }
        }
    }

    /// How many units of `key` the container can take right now.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`World::container_mut`], plus
    /// [`WorldError::UnknownDef`] for cells asked about an unknown kind.
    pub fn accepts(&self, container: ContainerRef, key: &ItemKey) -> Result<u32, WorldError> {
        match container {
            ContainerRef::Inventory(agent) | ContainerRef::Equipment(agent) => {
                let target = self
                    .container(container)
                    .ok_or(WorldError::AgentNotFound(agent))?;
                Ok(target.headroom_for(key))
            }
            ContainerRef::CarrySlot(agent) => {
                let carry = self
                    .container(container)
                    .ok_or(WorldError::AgentNotFound(agent))?;
                if carry.stacks().iter().any(|s| &s.key != key) {
                    Ok(0)
                } else {
                    Ok(carry.headroom_for(key))
                }
            }
            ContainerRef::Cell(id) => {
                let cell = self.cells.get(&id).ok_or(WorldError::CellNotFound(id))?;
                let def = self.catalog.require(&key.def)?;
                Ok(cell.remaining_capacity(key, def))
            }
            ContainerRef::Ground(pos) => {
                if !self.grid.is_passable(pos) {
                    return Err(WorldError::Impassable(pos));
                }
                Ok(self
                    .ground
                    .get(&pos)
                    .map_or(u32::MAX, |pile| pile.headroom_for(key)))
            }
        }
    }

    /// Set or clear the forbidden flag on a stack. Returns whether the stack
    /// was found.
    pub fn set_forbidden(&mut self, container: ContainerRef, item: ItemId, forbidden: bool) -> bool {
        let Ok(target) = self.container_mut(container) else {
            return false;
        };
        target.get_mut(item).is_some_and(|stack| {
            stack.forbidden = forbidden;
            true
        })
    }

    /// Drop empty ground piles so the map does not accumulate husks.
    pub(crate) fn prune_ground(&mut self, position: Position) {
        if self.ground.get(&position).is_some_and(Container::is_empty) {
            self.ground.remove(&position);
        }
    }
}
