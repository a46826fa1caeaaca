//! Agent invocation seam.
//!
//! The executor hands each runnable step to an [`AgentInvoker`]. The engine
//! ships with [`SimulatedAgent`], which produces a deterministic placeholder
//! instead of calling a real agent. A host wiring real agents supplies its
//! own invoker and owns timeout/retry policy at that boundary.

use maestro_types::workflow::StepDefinition;
use serde_json::{Value, json};

/// Output field carrying the agent's result text.
pub const SIMULATED_RESULT_KEY: &str = "simulatedResult";

/// Task text used when a step has none.
pub const NO_TASK: &str = "(no task specified)";

/// Runs one step's agent work.
///
/// Implementations must be pure with respect to `input`: the executor may
/// call them concurrently for steps of the same parallel level.
pub trait AgentInvoker: Send + Sync {
    fn invoke(&self, step: &StepDefinition, input: &Value) -> Value;
}

/// Deterministic stand-in for a real agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedAgent;

impl AgentInvoker for SimulatedAgent {
    fn invoke(&self, step: &StepDefinition, _input: &Value) -> Value {
        let task = step.task.as_deref().unwrap_or(NO_TASK);
        json!({
            SIMULATED_RESULT_KEY: format!("[Simulated] {} performed: {}", step.agent_type, task),
        })
    }
}
