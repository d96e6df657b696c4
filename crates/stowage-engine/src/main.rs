//! Engine binary for the Stowage hauling simulation.
//!
//! Wires configuration, logging, the seeded demo world, and the tick loop
//! together, then reports how every unload task ended.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `stowage-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the demo world from the configured seed
//! 4. Assign one unload task per agent
//! 5. Run the tick loop
//! 6. Log outcomes, loadout holders, and encumbrance

mod error;
mod progress;
mod scenario;

use std::path::Path;

use stowage_core::{Simulation, SimulationConfig, log_simulation_end, run_simulation};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressCallback;

const CONFIG_PATH: &str = "stowage-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, world construction, or the tick loop
/// fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Configuration first: it decides the log level and format.
    let (config, from_file) = load_config()?;

    // 2. Structured logging.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!("stowage-engine starting");
    if !from_file {
        info!(path = CONFIG_PATH, "Config file not found, using defaults");
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.time.tick_interval_ms,
        max_ticks = config.time.max_ticks,
        policy = ?config.task.policy,
        "Configuration loaded"
    );

    // 3. Demo world.
    let demo = scenario::build_demo_world(&config)?;
    let mut sim = Simulation::new(demo.world, demo.agents, &config);

    // 4. Tasks.
    for task in demo.tasks {
        sim.assign(task).map_err(EngineError::from)?;
    }
    info!(tasks = sim.scheduler.active_count(), "Unload tasks assigned");

    // 5. Tick loop.
    let mut callback = ProgressCallback::new(25);
    let result = run_simulation(&mut sim, &config, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 6. Report.
    log_simulation_end(&result, &sim);
    for (state, holders) in sim.agents.holders_by_state() {
        info!(state = %state, holders = holders.len(), "Loadout state holders");
    }
    for agent in sim.agents.ids() {
        match sim
            .agents
            .active_state_encumbrance(agent, sim.world.catalog())
        {
            Ok(Some(encumbrance)) => {
                info!(%agent, %encumbrance, outcome = ?sim.scheduler.outcome(agent), "Agent report");
            }
            Ok(None) => info!(%agent, outcome = ?sim.scheduler.outcome(agent), "Agent report"),
            Err(e) => warn!(%agent, error = %e, "encumbrance unavailable"),
        }
    }

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        finished = callback.finished(),
        "stowage-engine shutdown complete"
    );
    Ok(())
}

/// Load `stowage-config.yaml` from the working directory, or defaults if
/// it does not exist. The flag reports whether the file was read.
fn load_config() -> Result<(SimulationConfig, bool), EngineError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}
