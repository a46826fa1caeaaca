//! Configuration loader for Maestro.
//!
//! Reads `config.toml` (by default `~/.maestro/config.toml`) and
//! deserializes it into [`OrchestrationConfig`]. Falls back to defaults when
//! the file is missing or malformed; the engine always starts.

use std::path::Path;

use maestro_types::config::OrchestrationConfig;

/// Smallest usable concurrency bound and channel capacity.
const MIN_BOUND: usize = 1;

/// Load configuration from `path`.
///
/// - Missing file: defaults, logged at debug.
/// - Unreadable or malformed file: defaults, logged as a warning.
/// - Otherwise the parsed config, with bounds clamped by [`normalize`].
pub async fn load_config(path: &Path) -> OrchestrationConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return OrchestrationConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return OrchestrationConfig::default();
        }
    };

    match toml::from_str::<OrchestrationConfig>(&content) {
        Ok(config) => normalize(config),
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            OrchestrationConfig::default()
        }
    }
}

/// Clamp values that would leave the engine unable to run.
///
/// `max_parallel_steps` and `event_bus_capacity` have a floor of 1; a blank
/// `default_agent_type` reverts to the default.
pub fn normalize(mut config: OrchestrationConfig) -> OrchestrationConfig {
    if config.max_parallel_steps < MIN_BOUND {
        tracing::warn!("max_parallel_steps = 0 is not usable, raising to {MIN_BOUND}");
        config.max_parallel_steps = MIN_BOUND;
    }
    config.event_bus_capacity = config.event_bus_capacity.max(MIN_BOUND);

    let agent_type = config.default_agent_type.trim().to_string();
    config.default_agent_type = if agent_type.is_empty() {
        OrchestrationConfig::default().default_agent_type
    } else {
        agent_type
    };

    config
}
