//! Unload task state machine, scheduler, and tick loop for the Stowage simulation.
//!
//! This crate drives agents' unload work. It consumes the world primitives
//! from `stowage-world` and the policies from `stowage-agents`, and never
//! owns items itself.
//!
//! # Modules
//!
//! - [`clock`] -- [`WorldClock`] tick counter with checked advance.
//! - [`config`] -- Typed configuration loaded from `stowage-config.yaml`.
//! - [`runner`] -- [`Simulation`] state and the async [`run_simulation`] loop.
//! - [`scheduler`] -- [`TaskScheduler`]: one task per agent, deterministic
//!   per-tick order, teardown on completion or interruption.
//! - [`task`] -- The [`UnloadTask`] state machine, its pure transition
//!   function, and its saved form.

pub mod clock;
pub mod config;
pub mod runner;
pub mod scheduler;
pub mod task;

// Re-export primary types at crate root.
pub use clock::{ClockError, WorldClock};
pub use config::{ConfigError, PolicyKind, SimulationConfig, TaskConfig};
pub use runner::{
    NoOpCallback, RunnerError, Simulation, SimulationEndReason, SimulationResult, TickCallback,
    TickSummary, log_simulation_end, run_simulation,
};
pub use scheduler::{SchedulerError, TaskHandle, TaskScheduler};
pub use task::{
    Effect, StepEvent, TaskContext, Transition, UnloadState, UnloadTask, UnloadTaskSave,
    transition,
};
