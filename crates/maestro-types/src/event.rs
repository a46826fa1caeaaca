//! Event types for the Maestro workflow event bus.
//!
//! `WorkflowEvent` is broadcast as workflows are defined and executed.
//! All variants are Clone + Send + Sync for use with tokio broadcast channels.

use serde::{Deserialize, Serialize};

use crate::workflow::{ExecutionId, ExecutionMode, WorkflowId};

/// Events emitted by the orchestration engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    WorkflowCreated {
        workflow_id: WorkflowId,
        name: String,
        mode: ExecutionMode,
    },

    StepAdded {
        workflow_id: WorkflowId,
        step_name: String,
        depends_on: Vec<String>,
    },

    StepRemoved {
        workflow_id: WorkflowId,
        step_name: String,
    },

    ExecutionStarted {
        workflow_id: WorkflowId,
        execution_id: ExecutionId,
        total_steps: usize,
    },

    /// A step produced output.
    StepCompleted {
        workflow_id: WorkflowId,
        execution_id: ExecutionId,
        step_name: String,
        order: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parallel_group: Option<usize>,
    },

    /// A conditional step's guard evaluated false.
    StepSkipped {
        workflow_id: WorkflowId,
        execution_id: ExecutionId,
        step_name: String,
        order: usize,
    },

    ExecutionCompleted {
        workflow_id: WorkflowId,
        execution_id: ExecutionId,
        executed_steps: usize,
        skipped_steps: usize,
        duration_ms: u64,
    },

    WorkflowCancelled {
        workflow_id: WorkflowId,
        name: String,
    },
}

impl WorkflowEvent {
    /// The workflow this event belongs to.
    pub fn workflow_id(&self) -> WorkflowId {
        match self {
            Self::WorkflowCreated { workflow_id, .. }
            | Self::StepAdded { workflow_id, .. }
            | Self::StepRemoved { workflow_id, .. }
            | Self::ExecutionStarted { workflow_id, .. }
            | Self::StepCompleted { workflow_id, .. }
            | Self::StepSkipped { workflow_id, .. }
            | Self::ExecutionCompleted { workflow_id, .. }
            | Self::WorkflowCancelled { workflow_id, .. } => *workflow_id,
        }
    }
}
