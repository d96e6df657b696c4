//! Configuration loading and typed config structures for the Stowage simulation.
//!
//! The canonical configuration lives in `stowage-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file. Every field has a
//! default, so a partial (or empty) file is valid.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `stowage-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// World layout settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Tick timing.
    #[serde(default)]
    pub time: TimeConfig,

    /// Unload task tuning.
    #[serde(default)]
    pub task: TaskConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Demo population.
    #[serde(default)]
    pub agents: AgentsConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// World layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for layout and scheduling order.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Grid width in tiles.
    #[serde(default = "default_width")]
    pub width: i32,

    /// Grid height in tiles.
    #[serde(default = "default_height")]
    pub height: i32,

    /// Percentage (0-100) of tiles turned into walls.
    #[serde(default = "default_wall_density_percent")]
    pub wall_density_percent: u32,

    /// Number of storage cells to place.
    #[serde(default = "default_storage_cells")]
    pub storage_cells: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            width: default_width(),
            height: default_height(),
            wall_density_percent: default_wall_density_percent(),
            storage_cells: default_storage_cells(),
        }
    }
}

/// Tick timing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeConfig {
    /// Real-time milliseconds between ticks. Zero runs flat out.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks even if tasks are still running.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: default_max_ticks(),
        }
    }
}

/// Unload task tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskConfig {
    /// Whether the storage search also accepts low-priority cells.
    #[serde(default = "default_true")]
    pub desperate_locate: bool,

    /// Tiles an agent walks per tick.
    #[serde(default = "default_cells_per_tick")]
    pub cells_per_tick: u32,

    /// On teardown, put a carried stack back into the inventory before
    /// falling back to dropping it.
    #[serde(default = "default_true")]
    pub return_carried_on_teardown: bool,

    /// Which unload policy picks targets for unpinned tasks.
    #[serde(default)]
    pub policy: PolicyKind,
}

/// Selectable unload policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Unload whatever exceeds the agent's active loadout state.
    #[default]
    Loadout,
    /// Unload every inventory stack.
    Everything,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            desperate_locate: true,
            cells_per_tick: default_cells_per_tick(),
            return_carried_on_teardown: true,
            policy: PolicyKind::Loadout,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Demo population configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentsConfig {
    /// Number of agents to spawn.
    #[serde(default = "default_agent_count")]
    pub count: u32,

    /// Number of item stacks each agent starts with.
    #[serde(default = "default_items_per_agent")]
    pub items_per_agent: u32,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            count: default_agent_count(),
            items_per_agent: default_items_per_agent(),
        }
    }
}

fn default_world_name() -> String {
    "Stowage".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_width() -> i32 {
    24
}

const fn default_height() -> i32 {
    16
}

const fn default_wall_density_percent() -> u32 {
    10
}

const fn default_storage_cells() -> u32 {
    6
}

const fn default_tick_interval_ms() -> u64 {
    0
}

const fn default_max_ticks() -> u64 {
    500
}

const fn default_cells_per_tick() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "pretty".to_owned()
}

const fn default_agent_count() -> u32 {
    4
}

const fn default_items_per_agent() -> u32 {
    3
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.time.max_ticks, 500);
        assert!(config.task.desperate_locate);
        assert_eq!(config.task.cells_per_tick, 1);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test Depot"
  seed: 123
  width: 10
  height: 8
  wall_density_percent: 0
  storage_cells: 2

time:
  tick_interval_ms: 5
  max_ticks: 50

task:
  desperate_locate: false
  cells_per_tick: 3
  return_carried_on_teardown: false
  policy: everything

logging:
  level: "debug"
  format: "json"

agents:
  count: 2
  items_per_agent: 1
"#;

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.name, "Test Depot");
        assert_eq!(config.world.width, 10);
        assert_eq!(config.time.max_ticks, 50);
        assert!(!config.task.desperate_locate);
        assert_eq!(config.task.cells_per_tick, 3);
        assert!(!config.task.return_carried_on_teardown);
        assert_eq!(config.task.policy, PolicyKind::Everything);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.agents.count, 2);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 7\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Seed is overridden
        assert_eq!(config.world.seed, 7);
        // Everything else uses defaults
        assert_eq!(config.world.width, 24);
        assert_eq!(config.agents.items_per_agent, 3);
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(SimulationConfig::parse("").ok(), Some(SimulationConfig::default()));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("stowage-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
