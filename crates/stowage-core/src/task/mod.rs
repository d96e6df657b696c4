//! The unload task: state machine, driver, and saved form.

pub mod driver;
pub mod persist;
pub mod state;

pub use driver::{TaskContext, UnloadTask};
pub use persist::UnloadTaskSave;
pub use state::{Effect, StepEvent, Transition, UnloadState, transition};
