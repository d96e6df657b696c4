//! Tick callback that logs progress while the loop runs.

use stowage_core::{Simulation, TickCallback, TickSummary};
use tracing::{debug, info};

/// Logs every tick at `debug!` and a progress line every `every` ticks.
pub struct ProgressCallback {
    every: u64,
    finished: usize,
}

impl ProgressCallback {
    /// Report a progress line every `every` ticks. Zero disables the
    /// periodic line.
    pub const fn new(every: u64) -> Self {
        Self { every, finished: 0 }
    }

    /// Tasks seen finishing so far.
    pub const fn finished(&self) -> usize {
        self.finished
    }
}

impl TickCallback for ProgressCallback {
    fn on_tick(&mut self, summary: &TickSummary, sim: &Simulation) {
        self.finished = self
            .finished
            .saturating_add(summary.succeeded)
            .saturating_add(summary.incompletable);
        debug!(
            tick = summary.tick,
            stepped = summary.stepped,
            succeeded = summary.succeeded,
            incompletable = summary.incompletable,
            "Tick complete"
        );
        if self.every > 0 && summary.tick.checked_rem(self.every) == Some(0) {
            info!(
                tick = summary.tick,
                active = summary.still_active,
                finished = self.finished,
                reservations = sim.reservations.len(),
                "Unload progress"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stowage_agents::AgentManager;
    use stowage_core::SimulationConfig;
    use stowage_world::{Grid, ItemCatalog, World};

    use super::*;

    #[test]
    fn counts_finished_tasks() {
        let sim = Simulation::new(
            World::new(Grid::new(2, 2), ItemCatalog::new()),
            AgentManager::new(),
            &SimulationConfig::default(),
        );
        let mut callback = ProgressCallback::new(10);
        for (tick, succeeded, incompletable) in [(1, 1, 0), (2, 0, 2), (3, 0, 0)] {
            let summary = TickSummary {
                tick,
                stepped: 3,
                succeeded,
                incompletable,
                still_active: 0,
            };
            callback.on_tick(&summary, &sim);
        }
        assert_eq!(callback.finished(), 3);
    }
}
