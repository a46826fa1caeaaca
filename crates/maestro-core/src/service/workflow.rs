//! Workflow management service.
//!
//! Orchestrates workflow creation, step graph edits, execution, and
//! inspection on top of a `WorkflowRepository`. Every mutation is validated
//! in full before it is applied through the repository's atomic `update`,
//! so a rejected call never leaves a partial change behind.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use maestro_types::config::OrchestrationConfig;
use maestro_types::error::OrchestrationError;
use maestro_types::event::WorkflowEvent;
use maestro_types::workflow::{
    ExecutionId, ExecutionMode, ExecutionRecord, StepRequest, Workflow, WorkflowId,
    WorkflowStatus, WorkflowSummary,
};
use serde_json::Value;

use crate::event::EventBus;
use crate::repository::workflow::WorkflowRepository;
use crate::workflow::agent::{AgentInvoker, SimulatedAgent};
use crate::workflow::executor::WaveExecutor;
use crate::workflow::graph;

/// Parse a caller-supplied workflow id.
///
/// Absent or blank ids fail with `MissingWorkflowId`. A string that is not a
/// UUID cannot name any workflow, so it fails with `WorkflowNotFound`.
pub fn parse_workflow_id(raw: Option<&str>) -> Result<WorkflowId, OrchestrationError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(OrchestrationError::MissingWorkflowId)?;
    raw.parse()
        .map_err(|_| OrchestrationError::WorkflowNotFound(raw.to_string()))
}

/// A finished run together with the workflow facts callers report alongside it.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub workflow_id: WorkflowId,
    pub mode: ExecutionMode,
    pub record: ExecutionRecord,
}

/// Service owning the workflow lifecycle.
///
/// Generic over the repository so the engine never depends on a concrete
/// store.
pub struct WorkflowService<R: WorkflowRepository> {
    repo: Arc<R>,
    executor: WaveExecutor,
    event_bus: EventBus,
    config: OrchestrationConfig,
}

impl<R: WorkflowRepository> WorkflowService<R> {
    /// Create a service that runs steps with the [`SimulatedAgent`].
    pub fn new(repo: Arc<R>, config: OrchestrationConfig, event_bus: EventBus) -> Self {
        Self::with_invoker(repo, config, event_bus, Arc::new(SimulatedAgent))
    }

    /// Create a service with a custom agent invoker.
    pub fn with_invoker(
        repo: Arc<R>,
        config: OrchestrationConfig,
        event_bus: EventBus,
        invoker: Arc<dyn AgentInvoker>,
    ) -> Self {
        let executor = WaveExecutor::new(invoker, event_bus.clone(), config.max_parallel_steps);
        Self {
            repo,
            executor,
            event_bus,
            config,
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn config(&self) -> &OrchestrationConfig {
        &self.config
    }

    /// Create an empty workflow.
    ///
    /// `mode` falls back to the configured default when absent.
    pub fn create_workflow(
        &self,
        name: Option<&str>,
        description: Option<String>,
        mode: Option<&str>,
    ) -> Result<Workflow, OrchestrationError> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(OrchestrationError::MissingName)?
            .to_string();

        let mode = match mode {
            None => self.config.default_mode,
            Some(raw) => raw
                .parse::<ExecutionMode>()
                .map_err(|_| OrchestrationError::InvalidMode(raw.to_string()))?,
        };

        let workflow = Workflow::new(name, description, mode);
        self.repo.insert(workflow.clone());

        tracing::info!(
            workflow_id = %workflow.id,
            name = workflow.name.as_str(),
            mode = %mode,
            "workflow created"
        );
        self.event_bus.publish(WorkflowEvent::WorkflowCreated {
            workflow_id: workflow.id,
            name: workflow.name.clone(),
            mode,
        });

        Ok(workflow)
    }

    /// Add a step. Returns the workflow's step names after insertion.
    ///
    /// An absent `request` fails with `MissingStep` once the workflow is
    /// known to exist.
    pub fn add_step(
        &self,
        id: &WorkflowId,
        request: Option<StepRequest>,
    ) -> Result<Vec<String>, OrchestrationError> {
        let default_agent_type = self.config.default_agent_type.as_str();
        let (step_name, depends_on, names) = self
            .repo
            .update(id, |wf| {
                let request = request.ok_or(OrchestrationError::MissingStep)?;
                let step = graph::add_step(wf, request, default_agent_type)?;
                let (name, depends_on) = (step.name.clone(), step.depends_on.clone());
                Ok::<_, OrchestrationError>((name, depends_on, wf.step_names()))
            })
            .ok_or_else(|| OrchestrationError::WorkflowNotFound(id.to_string()))??;

        self.event_bus.publish(WorkflowEvent::StepAdded {
            workflow_id: *id,
            step_name,
            depends_on,
        });

        Ok(names)
    }

    /// Remove a step. Returns the remaining step names.
    pub fn remove_step(
        &self,
        id: &WorkflowId,
        step_name: Option<&str>,
    ) -> Result<Vec<String>, OrchestrationError> {
        let step_name = step_name.unwrap_or_default();
        let (removed, names) = self
            .repo
            .update(id, |wf| {
                let removed = graph::remove_step(wf, step_name)?;
                Ok::<_, OrchestrationError>((removed.name, wf.step_names()))
            })
            .ok_or_else(|| OrchestrationError::WorkflowNotFound(id.to_string()))??;

        self.event_bus.publish(WorkflowEvent::StepRemoved {
            workflow_id: *id,
            step_name: removed,
        });

        Ok(names)
    }

    /// Run the workflow once and append the record to its history.
    ///
    /// The run works on a snapshot taken up front. The record is appended in
    /// a single `update` after the run finishes; if the workflow was
    /// cancelled meanwhile, the run fails with `WorkflowNotFound`.
    pub async fn execute_workflow(
        &self,
        id: &WorkflowId,
        input: Value,
    ) -> Result<ExecutionOutcome, OrchestrationError> {
        let workflow = self.get_workflow(id)?;
        if workflow.steps.is_empty() {
            return Err(OrchestrationError::NoSteps(id.to_string()));
        }

        let execution_id = ExecutionId::new();
        let started_at = Utc::now();
        let started = Instant::now();

        tracing::info!(
            workflow_id = %id,
            execution_id = %execution_id,
            mode = %workflow.mode,
            steps = workflow.steps.len(),
            "execution started"
        );
        self.event_bus.publish(WorkflowEvent::ExecutionStarted {
            workflow_id: *id,
            execution_id,
            total_steps: workflow.steps.len(),
        });

        let trace = self.executor.run(&workflow, execution_id, &input).await?;
        let record = ExecutionRecord::from_trace(execution_id, input, trace, started_at);

        self.repo
            .update(id, |wf| {
                wf.execution_history.push(record.clone());
                wf.updated_at = Utc::now();
            })
            .ok_or_else(|| OrchestrationError::WorkflowNotFound(id.to_string()))?;

        let duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            workflow_id = %id,
            execution_id = %execution_id,
            executed = record.executed_steps,
            skipped = record.skipped_steps,
            duration_ms,
            "execution completed"
        );
        self.event_bus.publish(WorkflowEvent::ExecutionCompleted {
            workflow_id: *id,
            execution_id,
            executed_steps: record.executed_steps,
            skipped_steps: record.skipped_steps,
            duration_ms,
        });

        Ok(ExecutionOutcome {
            workflow_id: *id,
            mode: workflow.mode,
            record,
        })
    }

    pub fn get_workflow(&self, id: &WorkflowId) -> Result<Workflow, OrchestrationError> {
        self.repo
            .get(id)
            .ok_or_else(|| OrchestrationError::WorkflowNotFound(id.to_string()))
    }

    pub fn get_status(&self, id: &WorkflowId) -> Result<WorkflowStatus, OrchestrationError> {
        self.get_workflow(id).map(|wf| wf.status())
    }

    /// Every workflow in creation order.
    pub fn list_workflows(&self) -> Vec<WorkflowSummary> {
        self.repo.list().iter().map(Workflow::summary).collect()
    }

    /// Remove a workflow together with its history.
    pub fn cancel_workflow(&self, id: &WorkflowId) -> Result<Workflow, OrchestrationError> {
        let workflow = self
            .repo
            .remove(id)
            .ok_or_else(|| OrchestrationError::WorkflowNotFound(id.to_string()))?;

        tracing::info!(workflow_id = %id, name = workflow.name.as_str(), "workflow cancelled");
        self.event_bus.publish(WorkflowEvent::WorkflowCancelled {
            workflow_id: *id,
            name: workflow.name.clone(),
        });

        Ok(workflow)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
