//! Per-tick stepping of every agent's unload task.
//!
//! The scheduler holds at most one task per agent. Each tick it advances
//! every live task once, in an order derived from `(seed, tick, agent)`, and
//! tears a task down as soon as it reaches a terminal state.

use std::collections::BTreeMap;

use stowage_types::{AgentId, StepStatus};
use tracing::{debug, info};

use crate::task::{TaskContext, UnloadTask};

/// Handle returned by [`TaskScheduler::assign`]. One task per agent, so the
/// agent id is the handle.
pub type TaskHandle = AgentId;

/// Errors that can occur while scheduling tasks.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The agent already runs a task.
    #[error("agent {0} already has an active task")]
    AgentBusy(AgentId),

    /// No task is scheduled for the handle.
    #[error("no active task for agent {0}")]
    NoTask(TaskHandle),
}

/// Mix the seed, tick, and agent id into a stable ordering key.
fn deterministic_priority(seed: u64, tick: u64, agent: AgentId) -> u64 {
    let mut h: u64 = seed;
    h = h.wrapping_add(tick.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    for b in agent.into_inner().as_bytes() {
        h = h.wrapping_add(u64::from(*b));
        h = h.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    }
    h = (h ^ (h >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    h ^ (h >> 31)
}

/// Holds and steps every agent's active task.
#[derive(Debug, Clone, Default)]
pub struct TaskScheduler {
    seed: u64,
    tasks: BTreeMap<AgentId, UnloadTask>,
    outcomes: BTreeMap<AgentId, StepStatus>,
}

impl TaskScheduler {
    /// Create an empty scheduler.
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            tasks: BTreeMap::new(),
            outcomes: BTreeMap::new(),
        }
    }

    /// Start a task. Fails if the agent already runs one.
    pub fn assign(&mut self, task: UnloadTask) -> Result<TaskHandle, SchedulerError> {
        let agent = task.agent();
        if self.tasks.contains_key(&agent) {
            return Err(SchedulerError::AgentBusy(agent));
        }
        self.outcomes.remove(&agent);
        debug!(%agent, specific = task.is_specific(), "unload task assigned");
        self.tasks.insert(agent, task);
        Ok(agent)
    }

    /// Step one task. Terminal tasks are torn down and retired.
    pub fn advance(
        &mut self,
        handle: TaskHandle,
        ctx: &mut TaskContext<'_>,
    ) -> Result<StepStatus, SchedulerError> {
        let task = self
            .tasks
            .get_mut(&handle)
            .ok_or(SchedulerError::NoTask(handle))?;
        let status = task.advance(ctx);
        if status.is_terminal() {
            task.teardown(ctx);
            self.tasks.remove(&handle);
            self.outcomes.insert(handle, status);
        }
        Ok(status)
    }

    /// Stop a task at a tick boundary. It is torn down and recorded as
    /// [`StepStatus::Incompletable`].
    pub fn interrupt(
        &mut self,
        handle: TaskHandle,
        ctx: &mut TaskContext<'_>,
    ) -> Result<(), SchedulerError> {
        let mut task = self
            .tasks
            .remove(&handle)
            .ok_or(SchedulerError::NoTask(handle))?;
        task.teardown(ctx);
        self.outcomes.insert(handle, StepStatus::Incompletable);
        info!(agent = %handle, state = ?task.state(), "unload task interrupted");
        Ok(())
    }

    /// Order in which live tasks run on `tick`.
    pub fn order_for_tick(&self, tick: u64) -> Vec<AgentId> {
        let mut order: Vec<AgentId> = self.tasks.keys().copied().collect();
        order.sort_by_key(|agent| (deterministic_priority(self.seed, tick, *agent), *agent));
        order
    }

    /// Step every live task once. Returns each agent's status this tick.
    pub fn tick_all(&mut self, tick: u64, ctx: &mut TaskContext<'_>) -> Vec<(AgentId, StepStatus)> {
        self.order_for_tick(tick)
            .into_iter()
            .filter_map(|agent| {
                self.advance(agent, ctx)
                    .ok()
                    .map(|status| (agent, status))
            })
            .collect()
    }

    /// The live task for an agent.
    pub fn task(&self, handle: TaskHandle) -> Option<&UnloadTask> {
        self.tasks.get(&handle)
    }

    /// How a retired task ended.
    pub fn outcome(&self, handle: TaskHandle) -> Option<StepStatus> {
        self.outcomes.get(&handle).copied()
    }

    /// Every retired task's outcome.
    pub const fn outcomes(&self) -> &BTreeMap<AgentId, StepStatus> {
        &self.outcomes
    }

    /// Number of live tasks.
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is live.
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn priority_is_deterministic() {
        let agent = AgentId::new();
        assert_eq!(
            deterministic_priority(7, 3, agent),
            deterministic_priority(7, 3, agent)
        );
        assert_ne!(
            deterministic_priority(7, 3, agent),
            deterministic_priority(7, 4, agent)
        );
    }

    #[test]
    fn order_is_stable_for_a_tick_and_covers_every_task() {
        let mut scheduler = TaskScheduler::new(99);
        let agents: Vec<AgentId> = (0..5).map(|_| AgentId::new()).collect();
        for agent in &agents {
            scheduler
                .assign(UnloadTask::restore(*agent, crate::task::UnloadTaskSave::default(), None))
                .unwrap();
        }
        let first = scheduler.order_for_tick(10);
        assert_eq!(first, scheduler.order_for_tick(10));
        assert_eq!(first.len(), 5);
        for agent in &agents {
            assert!(first.contains(agent));
        }
    }

    #[test]
    fn one_task_per_agent() {
        let mut scheduler = TaskScheduler::new(1);
        let agent = AgentId::new();
        let task = UnloadTask::restore(agent, crate::task::UnloadTaskSave::default(), None);
        assert_eq!(scheduler.assign(task.clone()).unwrap(), agent);
        assert!(matches!(
            scheduler.assign(task),
            Err(SchedulerError::AgentBusy(_))
        ));
        assert_eq!(scheduler.active_count(), 1);
    }
}
