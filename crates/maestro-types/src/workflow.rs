//! Workflow domain types for Maestro.
//!
//! A `Workflow` is a named, ordered set of `StepDefinition`s plus an
//! append-only execution history. Each run produces an `ExecutionRecord`
//! whose trace holds one `StepResult` per evaluated step.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Unique identifier for a workflow, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(pub Uuid);

impl WorkflowId {
    /// Create a new WorkflowId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkflowId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// Unique identifier for one execution of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(pub Uuid);

impl ExecutionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Execution mode
// ---------------------------------------------------------------------------

/// How a workflow's steps are scheduled. Fixed at creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Steps run one after another in insertion order, outputs chained.
    #[default]
    Sequential,
    /// Steps are grouped into dependency levels.
    Parallel,
    /// Each step is guarded by its `condition`.
    Conditional,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
            Self::Conditional => "conditional",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(Self::Sequential),
            "parallel" => Ok(Self::Parallel),
            "conditional" => Ok(Self::Conditional),
            other => Err(format!("unknown execution mode: '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// A step as stored in a workflow.
///
/// `depends_on` only ever names steps inserted before this one, which keeps
/// the step graph acyclic by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    /// Unique key within the owning workflow.
    pub name: String,
    /// Identifies the agent that performs the step.
    pub agent_type: String,
    /// Free-text task handed to the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// Names of steps that must complete first (set semantics, ordered).
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Guard expression, only consulted by conditional workflows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Caller-supplied step payload for `add_step`, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "agent_type")]
    pub agent_type: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default, alias = "depends_on")]
    pub depends_on: Option<Vec<String>>,
    #[serde(default)]
    pub condition: Option<String>,
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// A named collection of steps with a fixed execution mode and its history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub mode: ExecutionMode,
    /// Insertion-ordered steps; names are unique.
    pub steps: Vec<StepDefinition>,
    /// Append-only record of every run.
    pub execution_history: Vec<ExecutionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Create an empty workflow with a fresh id.
    pub fn new(name: String, description: Option<String>, mode: ExecutionMode) -> Self {
        let now = Utc::now();
        Self {
            id: WorkflowId::new(),
            name,
            description,
            mode,
            steps: Vec::new(),
            execution_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Look up a step by name.
    pub fn step(&self, name: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn has_step(&self, name: &str) -> bool {
        self.step(name).is_some()
    }

    /// Step names in insertion order.
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.name.clone()).collect()
    }

    /// The most recent execution, if any.
    pub fn last_execution(&self) -> Option<&ExecutionRecord> {
        self.execution_history.last()
    }

    pub fn summary(&self) -> WorkflowSummary {
        WorkflowSummary {
            id: self.id,
            name: self.name.clone(),
            mode: self.mode,
            step_count: self.steps.len(),
            execution_count: self.execution_history.len(),
        }
    }

    pub fn status(&self) -> WorkflowStatus {
        WorkflowStatus {
            workflow_id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            mode: self.mode,
            step_count: self.steps.len(),
            steps: self.steps.clone(),
            execution_count: self.execution_history.len(),
            last_execution: self.last_execution().cloned(),
        }
    }
}

/// Listing entry returned by `list_workflows`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub id: WorkflowId,
    pub name: String,
    pub mode: ExecutionMode,
    pub step_count: usize,
    pub execution_count: usize,
}

/// Point-in-time view returned by `get_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    pub workflow_id: WorkflowId,
    pub name: String,
    pub description: Option<String>,
    pub mode: ExecutionMode,
    pub step_count: usize,
    pub steps: Vec<StepDefinition>,
    pub execution_count: usize,
    pub last_execution: Option<ExecutionRecord>,
}

// ---------------------------------------------------------------------------
// Execution records
// ---------------------------------------------------------------------------

/// Outcome of a single step within a run.
///
/// Serialized flat into the owning `StepResult` as `"status": "completed"`
/// (with `output`) or `"status": "skipped"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Completed { output: Value },
    Skipped,
}

/// One trace entry of an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub step_name: String,
    pub agent_type: String,
    /// 1-based position in the overall evaluation order.
    pub order: usize,
    #[serde(flatten)]
    pub outcome: StepOutcome,
    /// Data handed to the step.
    pub input: Value,
    /// 1-based dependency level; parallel mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_group: Option<usize>,
    /// Guard result; conditional mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_met: Option<bool>,
}

impl StepResult {
    pub fn completed(step: &StepDefinition, order: usize, input: Value, output: Value) -> Self {
        Self {
            step_name: step.name.clone(),
            agent_type: step.agent_type.clone(),
            order,
            outcome: StepOutcome::Completed { output },
            input,
            parallel_group: None,
            condition_met: None,
        }
    }

    pub fn skipped(step: &StepDefinition, order: usize, input: Value) -> Self {
        Self {
            step_name: step.name.clone(),
            agent_type: step.agent_type.clone(),
            order,
            outcome: StepOutcome::Skipped,
            input,
            parallel_group: None,
            condition_met: None,
        }
    }

    pub fn with_parallel_group(mut self, group: usize) -> Self {
        self.parallel_group = Some(group);
        self
    }

    pub fn with_condition_met(mut self, met: bool) -> Self {
        self.condition_met = Some(met);
        self
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, StepOutcome::Completed { .. })
    }

    pub fn output(&self) -> Option<&Value> {
        match &self.outcome {
            StepOutcome::Completed { output } => Some(output),
            StepOutcome::Skipped => None,
        }
    }

    pub fn status_str(&self) -> &'static str {
        match self.outcome {
            StepOutcome::Completed { .. } => "completed",
            StepOutcome::Skipped => "skipped",
        }
    }
}

/// One run of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub execution_id: ExecutionId,
    pub input: Value,
    pub trace: Vec<StepResult>,
    pub total_steps: usize,
    pub executed_steps: usize,
    pub skipped_steps: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ExecutionRecord {
    /// Build a record from a finished trace, deriving the counters.
    pub fn from_trace(
        execution_id: ExecutionId,
        input: Value,
        trace: Vec<StepResult>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let executed_steps = trace.iter().filter(|r| r.is_completed()).count();
        Self {
            execution_id,
            input,
            total_steps: trace.len(),
            executed_steps,
            skipped_steps: trace.len() - executed_steps,
            trace,
            started_at,
            completed_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
