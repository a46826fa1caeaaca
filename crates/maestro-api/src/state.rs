//! Application state wiring the store, service, and skill together.
//!
//! The skill is generic over its repository; AppState pins it to the
//! in-memory store. One AppState lives for the whole process, so every
//! request handled by the binary shares one store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use maestro_core::event::EventBus;
use maestro_core::service::workflow::WorkflowService;
use maestro_core::skill::OrchestrationSkill;
use maestro_core::workflow::store::InMemoryWorkflowStore;
use maestro_infra::config::load_config;
use maestro_infra::filesystem::{config_path, resolve_data_dir};
use maestro_types::config::OrchestrationConfig;

pub type ConcreteSkill = OrchestrationSkill<InMemoryWorkflowStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub skill: Arc<ConcreteSkill>,
    pub event_bus: EventBus,
    pub config: OrchestrationConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Resolve the data dir, load configuration, and wire the skill.
    ///
    /// An explicitly requested config file must exist; the default one may
    /// be absent.
    pub async fn init(data_dir: Option<PathBuf>, config: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = data_dir.unwrap_or_else(resolve_data_dir);

        let path = match config {
            Some(path) => {
                ensure_exists(&path).await?;
                path
            }
            None => config_path(&data_dir),
        };
        let config = load_config(&path).await;

        tracing::info!(
            data_dir = %data_dir.display(),
            config = %path.display(),
            "maestro initialized"
        );

        Ok(Self::from_config(config, data_dir))
    }

    pub fn from_config(config: OrchestrationConfig, data_dir: PathBuf) -> Self {
        let event_bus = EventBus::new(config.event_bus_capacity);
        let service = WorkflowService::new(
            Arc::new(InMemoryWorkflowStore::new()),
            config.clone(),
            event_bus.clone(),
        );

        Self {
            skill: Arc::new(OrchestrationSkill::new(service)),
            event_bus,
            config,
            data_dir,
        }
    }
}

async fn ensure_exists(path: &Path) -> anyhow::Result<()> {
    let exists = tokio::fs::try_exists(path)
        .await
        .with_context(|| format!("failed to check config file {}", path.display()))?;
    if !exists {
        bail!("config file not found: {}", path.display());
    }
    Ok(())
}
