//! Tick-bounded agent movement.
//!
//! A [`Mover`] advances an agent a bounded number of tiles toward a target
//! each call and reports whether it has arrived. Long walks therefore span
//! many ticks without blocking the scheduler.

use stowage_types::{AgentId, PathEndMode, Position};
use tracing::{debug, warn};

use crate::reservation::ReservationManager;
use crate::world::World;

/// Result of one movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveProgress {
    /// Still on the way; call again next tick.
    Moving,
    /// The target is reached under the requested end mode.
    Arrived,
    /// No path to the target exists right now.
    Unreachable,
}

/// Moves agents across the world.
pub trait Mover {
    /// Advance `agent` toward `target` by one tick's worth of movement.
    fn step_toward(
        &self,
        world: &mut World,
        reservations: &ReservationManager,
        agent: AgentId,
        target: Position,
        mode: PathEndMode,
    ) -> MoveProgress;
}

/// Reference mover: replans a BFS path every tick and walks up to
/// `cells_per_tick` tiles along it.
///
/// Tiles reserved by other agents are treated as walls while planning.
#[derive(Debug, Clone, Copy)]
pub struct GridMover {
    /// Tiles advanced per call. Zero is treated as one.
    pub cells_per_tick: u32,
}

impl GridMover {
    /// Create a mover with the given speed.
    pub const fn new(cells_per_tick: u32) -> Self {
        Self { cells_per_tick }
    }
}

impl Default for GridMover {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Mover for GridMover {
    fn step_toward(
        &self,
        world: &mut World,
        reservations: &ReservationManager,
        agent: AgentId,
        target: Position,
        mode: PathEndMode,
    ) -> MoveProgress {
        let Some(start) = world.position_of(agent) else {
            return MoveProgress::Unreachable;
        };
        if start.reached(target, mode) {
            return MoveProgress::Arrived;
        }

        let blocked = reservations.tiles_blocked_for(agent);
        let Some(path) = world.grid().path_to(start, target, mode, &blocked) else {
            debug!(%agent, from = %start, to = %target, "no path");
            return MoveProgress::Unreachable;
        };

        let speed = usize::try_from(self.cells_per_tick.max(1)).unwrap_or(usize::MAX);
        let steps = speed.min(path.len().saturating_sub(1));
        let Some(&next) = path.get(steps) else {
            return MoveProgress::Unreachable;
        };
        if let Err(err) = world.set_position(agent, next) {
            warn!(%agent, error = %err, "move rejected by world");
            return MoveProgress::Unreachable;
        }

        if next.reached(target, mode) {
            debug!(%agent, at = %next, "arrived");
            MoveProgress::Arrived
        } else {
            MoveProgress::Moving
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::ItemCatalog;
    use crate::grid::Grid;
    use crate::reservation::Resource;

    fn world_with_agent(width: i32, height: i32) -> (World, AgentId) {
        let mut world = World::new(Grid::new(width, height), ItemCatalog::new());
        let agent = AgentId::new();
        world.add_agent(agent, Position::new(0, 0)).unwrap();
        (world, agent)
    }

    #[test]
    fn walks_one_tile_per_tick() {
        let (mut world, agent) = world_with_agent(6, 1);
        let reservations = ReservationManager::new();
        let mover = GridMover::new(1);
        let target = Position::new(4, 0);
        let mut ticks = 0;
        loop {
            ticks += 1;
            match mover.step_toward(&mut world, &reservations, agent, target, PathEndMode::Touch) {
                MoveProgress::Moving => {}
                MoveProgress::Arrived => break,
                MoveProgress::Unreachable => unreachable!("open corridor"),
            }
        }
        assert_eq!(ticks, 3);
        assert_eq!(world.position_of(agent), Some(Position::new(3, 0)));
    }

    #[test]
    fn faster_mover_arrives_in_one_tick() {
        let (mut world, agent) = world_with_agent(6, 1);
        let reservations = ReservationManager::new();
        let progress = GridMover::new(10).step_toward(
            &mut world,
            &reservations,
            agent,
            Position::new(5, 0),
            PathEndMode::OnCell,
        );
        assert_eq!(progress, MoveProgress::Arrived);
        assert_eq!(world.position_of(agent), Some(Position::new(5, 0)));
    }

    #[test]
    fn already_adjacent_is_arrived_without_moving() {
        let (mut world, agent) = world_with_agent(3, 3);
        let reservations = ReservationManager::new();
        let progress = GridMover::default().step_toward(
            &mut world,
            &reservations,
            agent,
            Position::new(1, 0),
            PathEndMode::Touch,
        );
        assert_eq!(progress, MoveProgress::Arrived);
        assert_eq!(world.position_of(agent), Some(Position::new(0, 0)));
    }

    #[test]
    fn tile_reserved_by_another_agent_blocks_corridor() {
        let (mut world, agent) = world_with_agent(5, 1);
        let mut reservations = ReservationManager::new();
        assert!(reservations.reserve(AgentId::new(), Resource::Tile(Position::new(2, 0))));
        let progress = GridMover::default().step_toward(
            &mut world,
            &reservations,
            agent,
            Position::new(4, 0),
            PathEndMode::OnCell,
        );
        assert_eq!(progress, MoveProgress::Unreachable);
        assert_eq!(world.position_of(agent), Some(Position::new(0, 0)));
    }
}
