//! Drives an [`UnloadTask`] against the world one step per call.
//!
//! Each call to [`UnloadTask::advance`] performs the current state's single
//! action against the collaborators in a [`TaskContext`], turns what it saw
//! into a [`StepEvent`], runs the pure [`transition`], and applies the
//! resulting effects. Collaborator errors never escape: they are logged and
//! end the run as [`StepStatus::Incompletable`].

use stowage_agents::{AgentManager, UnloadPolicy};
use stowage_types::{
    AgentId, Capacity, CellId, ContainerRef, ItemId, PathEndMode, Position, StepStatus,
    Unloadable,
};
use stowage_world::{
    ContainerTransfer, MoveProgress, Mover, ReservationManager, Resource, StorageLocator, World,
    WorldError,
};
use tracing::{debug, info, warn};

use super::persist::UnloadTaskSave;
use super::state::{Effect, StepEvent, Transition, UnloadState, transition};
use crate::config::TaskConfig;

/// Everything a task step may read or mutate.
pub struct TaskContext<'a> {
    /// Shared world state.
    pub world: &'a mut World,
    /// Shared reservation table.
    pub reservations: &'a mut ReservationManager,
    /// Storage search.
    pub locator: &'a dyn StorageLocator,
    /// Picks targets for unpinned tasks.
    pub policy: &'a dyn UnloadPolicy,
    /// Moves agents.
    pub mover: &'a dyn Mover,
    /// Agent capacities.
    pub agents: &'a AgentManager,
    /// Task tuning.
    pub config: &'a TaskConfig,
}

/// One agent's unload operation in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnloadTask {
    agent: AgentId,
    state: UnloadState,
    target_item: Option<ItemId>,
    target_cell: Option<CellId>,
    count_to_drop: u32,
    specific_item: bool,
    restarts: u32,
}

impl UnloadTask {
    /// Create a task for `agent`.
    ///
    /// Passing an item pins the task to it. The quantity defaults to the
    /// item's full held count and is clamped to it. Without an item the
    /// quantity is ignored and the policy chooses.
    pub fn create(
        agent: AgentId,
        item: Option<ItemId>,
        quantity: Option<u32>,
        world: &World,
    ) -> Self {
        let count_to_drop = item.map_or(0, |item| {
            let held = world.held_stack(agent, item).map_or(0, |stack| stack.count);
            quantity.map_or(held, |requested| requested.min(held))
        });
        Self {
            agent,
            state: UnloadState::SelectTarget,
            target_item: item,
            target_cell: None,
            count_to_drop,
            specific_item: item.is_some(),
            restarts: 0,
        }
    }

    /// Rebuild a task from its saved fields. The run restarts at
    /// [`UnloadState::SelectTarget`].
    pub const fn restore(agent: AgentId, save: UnloadTaskSave, item: Option<ItemId>) -> Self {
        Self {
            agent,
            state: UnloadState::SelectTarget,
            target_item: item,
            target_cell: None,
            count_to_drop: save.count_to_drop,
            specific_item: save.specific_item,
            restarts: 0,
        }
    }

    /// The persisted fields.
    pub const fn save(&self) -> UnloadTaskSave {
        UnloadTaskSave {
            count_to_drop: self.count_to_drop,
            specific_item: self.specific_item,
        }
    }

    /// The agent running the task.
    pub const fn agent(&self) -> AgentId {
        self.agent
    }

    /// Current state.
    pub const fn state(&self) -> UnloadState {
        self.state
    }

    /// Caller-visible status.
    pub const fn status(&self) -> StepStatus {
        self.state.status()
    }

    /// Item being unloaded, if resolved.
    pub const fn target_item(&self) -> Option<ItemId> {
        self.target_item
    }

    /// Destination cell, if resolved.
    pub const fn target_cell(&self) -> Option<CellId> {
        self.target_cell
    }

    /// Units the task intends to move.
    pub const fn count_to_drop(&self) -> u32 {
        self.count_to_drop
    }

    /// Whether the caller pinned the target item.
    pub const fn is_specific(&self) -> bool {
        self.specific_item
    }

    /// How many times the run looped back to pick another item.
    pub const fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Perform one step.
    pub fn advance(&mut self, ctx: &mut TaskContext<'_>) -> StepStatus {
        if self.state.is_terminal() {
            return self.status();
        }

        let event = self.observe(ctx);
        let Transition { next, effects } = transition(self.state, event);
        debug!(agent = %self.agent, from = ?self.state, ?event, to = ?next, "unload step");
        self.state = next;

        for effect in effects {
            if let Err(err) = self.apply(effect, ctx) {
                warn!(agent = %self.agent, ?effect, error = %err, "unload effect failed");
                self.release_cell(ctx.reservations);
                self.state = UnloadState::Incompletable;
                break;
            }
        }

        match self.state {
            UnloadState::Succeeded => {
                info!(agent = %self.agent, restarts = self.restarts, "unload task succeeded");
            }
            UnloadState::Incompletable => {
                info!(agent = %self.agent, item = ?self.target_item, "unload task incompletable");
            }
            _ => {}
        }
        self.status()
    }

    /// Clean up after the run ends or is interrupted: release every claim
    /// the agent holds and empty the carry slot (back into the inventory if
    /// configured and possible, otherwise onto the ground).
    pub fn teardown(&mut self, ctx: &mut TaskContext<'_>) {
        let agent = self.agent;
        let released = ctx.reservations.release_all(agent);
        self.target_cell = None;

        let Some((carried, count)) = ctx.world.carried(agent).map(|s| (s.id, s.count)) else {
            debug!(%agent, released, "unload task torn down");
            return;
        };

        if ctx.config.return_carried_on_teardown {
            match ctx.world.transfer(
                carried,
                ContainerRef::CarrySlot(agent),
                ContainerRef::Inventory(agent),
                count,
            ) {
                Ok(receipt) => {
                    debug!(%agent, released, returned = receipt.count, "unload task torn down");
                    return;
                }
                Err(err) => warn!(%agent, error = %err, "carried stack refused by inventory"),
            }
        }

        let dropped = ctx.world.position_of(agent).map(|pos| {
            ctx.world
                .try_drop_near(carried, ContainerRef::CarrySlot(agent), pos, count)
        });
        match dropped {
            Some(Ok(receipt)) => {
                debug!(%agent, released, dropped = receipt.count, "unload task torn down");
            }
            Some(Err(err)) => warn!(%agent, error = %err, "could not drop carried stack"),
            None => warn!(%agent, "agent has no position; carried stack left in place"),
        }
    }

    // -------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------

    fn observe(&self, ctx: &mut TaskContext<'_>) -> StepEvent {
        match self.state {
            UnloadState::SelectTarget => self.select_target(ctx),
            UnloadState::LocateStorage => self.locate_storage(ctx),
            UnloadState::ReserveStorage => self.reserve_storage(ctx),
            UnloadState::Travel => self.travel(ctx),
            UnloadState::PickUpAndCarry => self.pick_up(ctx),
            UnloadState::CarryAndPlace => self.carry_and_place(ctx),
            UnloadState::Finalize => self.finalize(ctx),
            UnloadState::Succeeded | UnloadState::Incompletable => StepEvent::Done,
        }
    }

    fn select_target(&self, ctx: &TaskContext<'_>) -> StepEvent {
        match self.target_item {
            Some(item) if ctx.world.find_held(self.agent, item).is_some() => StepEvent::Pinned,
            Some(_) => StepEvent::PinnedItemMissing,
            None => ctx
                .policy
                .next_unloadable(ctx.world, self.agent)
                .map_or(StepEvent::NothingToUnload, |pick| {
                    StepEvent::PolicyPicked(self.cap_restored(pick))
                }),
        }
    }

    /// A restored specific task keeps its saved quantity as an upper bound.
    fn cap_restored(&self, mut pick: Unloadable) -> Unloadable {
        if self.specific_item && self.count_to_drop > 0 {
            pick.count = pick.count.min(self.count_to_drop);
        }
        pick
    }

    fn locate_storage(&self, ctx: &TaskContext<'_>) -> StepEvent {
        let Some(item) = self.held_target(ctx.world) else {
            return StepEvent::ItemMissing;
        };
        ctx.locator
            .find(
                ctx.world,
                ctx.reservations,
                item,
                self.agent,
                ctx.config.desperate_locate,
            )
            .map_or(StepEvent::NoCellFound, StepEvent::CellFound)
    }

    fn reserve_storage(&self, ctx: &mut TaskContext<'_>) -> StepEvent {
        let (Some(item), Some(cell)) = (self.target_item, self.target_cell) else {
            return StepEvent::ReservationDenied;
        };
        let usable = ctx
            .world
            .held_stack(self.agent, item)
            .and_then(|stack| ctx.world.accepts(ContainerRef::Cell(cell), &stack.key).ok())
            .is_some_and(|room| room > 0);
        if !usable {
            debug!(agent = %self.agent, %cell, "cell no longer usable");
            return StepEvent::ReservationDenied;
        }
        if ctx.reservations.reserve(self.agent, Resource::Cell(cell)) {
            StepEvent::Reserved
        } else {
            StepEvent::ReservationDenied
        }
    }

    fn travel(&self, ctx: &mut TaskContext<'_>) -> StepEvent {
        let Some(target) = self.cell_position(ctx.world) else {
            return StepEvent::Unreachable;
        };
        self.step(ctx, target)
    }

    fn pick_up(&self, ctx: &mut TaskContext<'_>) -> StepEvent {
        let agent = self.agent;
        let Some(item) = self.held_target(ctx.world) else {
            return StepEvent::ItemMissing;
        };
        let Some(source) = ctx.world.find_held(agent, item) else {
            return StepEvent::ItemMissing;
        };

        let storable = ctx
            .world
            .held_stack(agent, item)
            .and_then(|stack| ctx.world.catalog().get(stack.def()))
            .is_some_and(|def| def.storable);
        if !ctx.agents.capable_of(agent, Capacity::Manipulation) || !storable {
            debug!(%agent, %item, storable, "cannot store; dropping instead");
            return StepEvent::CannotStore;
        }

        match ctx.world.transfer(
            item,
            source,
            ContainerRef::CarrySlot(agent),
            self.count_to_drop,
        ) {
            Ok(receipt) => StepEvent::PickedUp {
                moved: receipt.count,
            },
            Err(err) => {
                warn!(%agent, %item, error = %err, "pickup failed");
                StepEvent::PickedUp { moved: 0 }
            }
        }
    }

    fn carry_and_place(&self, ctx: &mut TaskContext<'_>) -> StepEvent {
        let (Some(cell), Some(target)) = (self.target_cell, self.cell_position(ctx.world)) else {
            return StepEvent::Unreachable;
        };
        match self.step(ctx, target) {
            StepEvent::Arrived => self.deposit(ctx, cell),
            other => other,
        }
    }

    fn deposit(&self, ctx: &mut TaskContext<'_>, cell: CellId) -> StepEvent {
        let agent = self.agent;
        let Some((carried, key, count)) = ctx
            .world
            .carried(agent)
            .map(|s| (s.id, s.key.clone(), s.count))
        else {
            return StepEvent::ItemMissing;
        };

        let room = match ctx.world.accepts(ContainerRef::Cell(cell), &key) {
            Ok(room) => room,
            Err(err) => {
                warn!(%agent, %cell, error = %err, "cell lookup failed");
                return StepEvent::Failed;
            }
        };
        let placed = room.min(count);
        if placed > 0 {
            if let Err(err) = ctx.world.transfer(
                carried,
                ContainerRef::CarrySlot(agent),
                ContainerRef::Cell(cell),
                placed,
            ) {
                warn!(%agent, %cell, error = %err, "deposit failed");
                return StepEvent::Failed;
            }
        }
        let remainder = count.saturating_sub(placed);
        info!(%agent, %cell, placed, remainder, "deposited into storage");
        StepEvent::Placed { remainder }
    }

    fn finalize(&self, ctx: &TaskContext<'_>) -> StepEvent {
        if self.specific_item {
            return StepEvent::Done;
        }
        if ctx.policy.next_unloadable(ctx.world, self.agent).is_some() {
            StepEvent::MoreToUnload
        } else {
            StepEvent::Done
        }
    }

    // -------------------------------------------------------------------
    // Effects
    // -------------------------------------------------------------------

    fn apply(&mut self, effect: Effect, ctx: &mut TaskContext<'_>) -> Result<(), WorldError> {
        match effect {
            Effect::AdoptItem(item) => self.target_item = Some(item),
            Effect::AdoptCell(cell) => self.target_cell = Some(cell),
            Effect::RecordQuantity(count) => self.count_to_drop = count,
            Effect::Unforbid => {
                if let Some(carried) = ctx.world.carried(self.agent).map(|s| s.id) {
                    ctx.world
                        .set_forbidden(ContainerRef::CarrySlot(self.agent), carried, false);
                }
            }
            Effect::DropOnGround => self.drop_near_agent(ctx)?,
            Effect::ReleaseReservation => self.release_cell(ctx.reservations),
            Effect::ResetTargets => {
                self.target_item = None;
                self.target_cell = None;
                self.count_to_drop = 0;
                self.restarts = self.restarts.saturating_add(1);
            }
        }
        Ok(())
    }

    /// Drop the carried stack if there is one, otherwise the target item.
    /// An error here ends the run as Incompletable.
    fn drop_near_agent(&self, ctx: &mut TaskContext<'_>) -> Result<(), WorldError> {
        let agent = self.agent;
        let pos = ctx
            .world
            .position_of(agent)
            .ok_or(WorldError::AgentNotFound(agent))?;

        if let Some((carried, count)) = ctx.world.carried(agent).map(|s| (s.id, s.count)) {
            ctx.world
                .try_drop_near(carried, ContainerRef::CarrySlot(agent), pos, count)?;
            return Ok(());
        }

        let Some(item) = self.target_item else {
            return Ok(());
        };
        let source = ctx
            .world
            .find_held(agent, item)
            .ok_or(WorldError::ItemNotInContainer {
                item,
                container: ContainerRef::Inventory(agent),
            })?;
        ctx.world.try_drop_near(item, source, pos, self.count_to_drop)?;
        Ok(())
    }

    // -------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------

    fn held_target(&self, world: &World) -> Option<ItemId> {
        self.target_item
            .filter(|item| world.find_held(self.agent, *item).is_some())
    }

    fn cell_position(&self, world: &World) -> Option<Position> {
        world.cell(self.target_cell?).map(|cell| cell.position)
    }

    fn step(&self, ctx: &mut TaskContext<'_>, target: Position) -> StepEvent {
        match ctx.mover.step_toward(
            ctx.world,
            ctx.reservations,
            self.agent,
            target,
            PathEndMode::Touch,
        ) {
            MoveProgress::Moving => StepEvent::Moving,
            MoveProgress::Arrived => StepEvent::Arrived,
            MoveProgress::Unreachable => StepEvent::Unreachable,
        }
    }

    fn release_cell(&self, reservations: &mut ReservationManager) {
        if let Some(cell) = self.target_cell {
            reservations.release(self.agent, Resource::Cell(cell));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stowage_types::{ItemKey, ItemStack};
    use stowage_world::{Grid, ItemCatalog};

    use super::*;

    fn world_with_steel(count: u32) -> (World, AgentId, ItemId) {
        let mut world = World::new(Grid::new(4, 4), ItemCatalog::new());
        let agent = AgentId::new();
        world.add_agent(agent, Position::new(0, 0)).unwrap();
        let item = world
            .give_inventory(agent, ItemStack::new(ItemKey::plain("steel"), count))
            .unwrap();
        (world, agent, item)
    }

    #[test]
    fn pinned_quantity_defaults_to_held_count() {
        let (world, agent, item) = world_with_steel(6);
        let task = UnloadTask::create(agent, Some(item), None, &world);
        assert!(task.is_specific());
        assert_eq!(task.count_to_drop(), 6);
        assert_eq!(task.state(), UnloadState::SelectTarget);
    }

    #[test]
    fn pinned_quantity_is_clamped() {
        let (world, agent, item) = world_with_steel(6);
        assert_eq!(UnloadTask::create(agent, Some(item), Some(9), &world).count_to_drop(), 6);
        assert_eq!(UnloadTask::create(agent, Some(item), Some(2), &world).count_to_drop(), 2);
    }

    #[test]
    fn unpinned_task_ignores_quantity() {
        let (world, agent, _) = world_with_steel(6);
        let task = UnloadTask::create(agent, None, Some(3), &world);
        assert!(!task.is_specific());
        assert_eq!(task.count_to_drop(), 0);
        assert_eq!(task.target_item(), None);
    }

    #[test]
    fn save_and_restore_keep_persisted_fields() {
        let (world, agent, item) = world_with_steel(4);
        let task = UnloadTask::create(agent, Some(item), Some(3), &world);
        let restored = UnloadTask::restore(agent, task.save(), None);
        assert!(restored.is_specific());
        assert_eq!(restored.count_to_drop(), 3);
        assert_eq!(restored.target_item(), None);
        assert_eq!(restored.state(), UnloadState::SelectTarget);
    }
}
