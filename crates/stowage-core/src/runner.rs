//! Tick loop runner.
//!
//! [`run_simulation`] advances the clock, steps every live unload task once
//! per tick, notifies a [`TickCallback`], and stops when every task has
//! finished or the tick limit is hit. Between ticks it sleeps for the
//! configured interval so a watcher can follow along.

use stowage_agents::{AgentManager, UnloadEverything, UnloadPolicy};
use stowage_types::StepStatus;
use stowage_world::{GridMover, NearestStorageLocator, ReservationManager, World};
use tracing::{info, warn};

use crate::clock::{ClockError, WorldClock};
use crate::config::{PolicyKind, SimulationConfig, TaskConfig};
use crate::scheduler::{SchedulerError, TaskHandle, TaskScheduler};
use crate::task::{TaskContext, UnloadTask};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A scheduler operation failed.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: SchedulerError,
    },
}

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// Every task reached a terminal state.
    AllTasksFinished,
    /// The configured tick limit was reached.
    MaxTicksReached,
}

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// Tick number that just ran.
    pub tick: u64,
    /// Tasks stepped this tick.
    pub stepped: usize,
    /// Tasks that finished with [`StepStatus::Succeeded`] this tick.
    pub succeeded: usize,
    /// Tasks that finished with [`StepStatus::Incompletable`] this tick.
    pub incompletable: usize,
    /// Tasks still running after the tick.
    pub still_active: usize,
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes.
    fn on_tick(&mut self, summary: &TickSummary, state: &Simulation);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &Simulation) {}
}

/// All mutable simulation state plus the collaborators tasks use.
#[derive(Debug)]
pub struct Simulation {
    /// Shared world.
    pub world: World,
    /// Shared reservation table.
    pub reservations: ReservationManager,
    /// Agent profiles and loadouts.
    pub agents: AgentManager,
    /// Live tasks.
    pub scheduler: TaskScheduler,
    /// Tick counter.
    pub clock: WorldClock,
    /// Storage search.
    pub locator: NearestStorageLocator,
    /// Movement.
    pub mover: GridMover,
    /// Task tuning.
    pub task_config: TaskConfig,
}

impl Simulation {
    /// Wrap a populated world and agent registry.
    pub fn new(world: World, agents: AgentManager, config: &SimulationConfig) -> Self {
        Self {
            world,
            reservations: ReservationManager::new(),
            agents,
            scheduler: TaskScheduler::new(config.world.seed),
            clock: WorldClock::new(),
            locator: NearestStorageLocator,
            mover: GridMover::new(config.task.cells_per_tick),
            task_config: config.task.clone(),
        }
    }

    /// Give an agent a new unload task.
    pub fn assign(&mut self, task: UnloadTask) -> Result<TaskHandle, SchedulerError> {
        self.scheduler.assign(task)
    }

    /// Interrupt an agent's task at the current tick boundary.
    pub fn interrupt(&mut self, handle: TaskHandle) -> Result<(), SchedulerError> {
        self.with_context(|scheduler, ctx| scheduler.interrupt(handle, ctx))
    }

    /// Run `f` with the scheduler and a task context over this state. The
    /// configured policy kind picks the unload policy.
    fn with_context<R>(
        &mut self,
        f: impl FnOnce(&mut TaskScheduler, &mut TaskContext<'_>) -> R,
    ) -> R {
        let Self {
            world,
            reservations,
            agents,
            scheduler,
            locator,
            mover,
            task_config,
            ..
        } = self;
        let policy: &dyn UnloadPolicy = match task_config.policy {
            PolicyKind::Loadout => &*agents,
            PolicyKind::Everything => &UnloadEverything,
        };
        let mut ctx = TaskContext {
            world,
            reservations,
            locator: &*locator,
            policy,
            mover: &*mover,
            agents: &*agents,
            config: &*task_config,
        };
        f(scheduler, &mut ctx)
    }

    /// Advance the clock and step every live task once.
    pub fn step(&mut self) -> Result<TickSummary, RunnerError> {
        let tick = self.clock.advance()?;
        let results = self.with_context(|scheduler, ctx| scheduler.tick_all(tick, ctx));
        let count = |wanted: StepStatus| results.iter().filter(|(_, s)| *s == wanted).count();
        Ok(TickSummary {
            tick,
            stepped: results.len(),
            succeeded: count(StepStatus::Succeeded),
            incompletable: count(StepStatus::Incompletable),
            still_active: self.scheduler.active_count(),
        })
    }
}

/// Run the tick loop until every task ends or `max_ticks` is reached.
///
/// A `max_ticks` of zero means no limit.
pub async fn run_simulation(
    state: &mut Simulation,
    config: &SimulationConfig,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = config.time.max_ticks,
        tick_interval_ms = config.time.tick_interval_ms,
        tasks = state.scheduler.active_count(),
        "Simulation starting"
    );

    loop {
        if state.scheduler.is_idle() {
            info!(total_ticks, "All unload tasks finished");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::AllTasksFinished,
                final_summary: last_summary,
                total_ticks,
            });
        }

        let summary = state.step()?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, state);

        if config.time.max_ticks > 0 && summary.tick >= config.time.max_ticks {
            info!(
                tick = summary.tick,
                max_ticks = config.time.max_ticks,
                still_active = summary.still_active,
                "Tick limit reached"
            );
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);

        let interval_ms = config.time.tick_interval_ms;
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult, state: &Simulation) {
    let outcomes = state.scheduler.outcomes();
    let succeeded = outcomes
        .values()
        .filter(|s| **s == StepStatus::Succeeded)
        .count();
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        succeeded,
        incompletable = outcomes.len().saturating_sub(succeeded),
        still_active = state.scheduler.active_count(),
        "Simulation ended"
    );
    if result.final_summary.is_none() {
        warn!("Simulation ended with no ticks executed");
    }
}
