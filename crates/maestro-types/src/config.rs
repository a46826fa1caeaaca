//! Configuration types for Maestro.
//!
//! `OrchestrationConfig` represents the `config.toml` that tunes engine
//! defaults. Every field has a sensible default, so an empty file is valid.

use serde::{Deserialize, Serialize};

use crate::workflow::ExecutionMode;

/// Engine configuration.
///
/// Loaded from `~/.maestro/config.toml` (or `--config`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationConfig {
    /// Mode used when `create_workflow` omits `mode`.
    #[serde(default)]
    pub default_mode: ExecutionMode,

    /// Agent type assigned to steps that omit `agentType`.
    #[serde(default = "default_agent_type")]
    pub default_agent_type: String,

    /// Upper bound on steps of one parallel level running at once.
    #[serde(default = "default_max_parallel_steps")]
    pub max_parallel_steps: usize,

    /// Capacity of the workflow event broadcast channel.
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

fn default_agent_type() -> String {
    "default".to_string()
}

fn default_max_parallel_steps() -> usize {
    8
}

fn default_event_bus_capacity() -> usize {
    1024
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            default_mode: ExecutionMode::default(),
            default_agent_type: default_agent_type(),
            max_parallel_steps: default_max_parallel_steps(),
            event_bus_capacity: default_event_bus_capacity(),
        }
    }
}
