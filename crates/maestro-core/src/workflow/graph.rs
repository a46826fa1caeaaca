//! Step graph construction: validated insertion and removal of steps.
//!
//! Dependencies may only name steps that already exist when a step is
//! added. Since a step can never reference a later one, the graph is acyclic
//! by construction and insertion order is always a valid topological order.
//! No cycle detection runs anywhere in the engine.

use std::collections::HashSet;

use chrono::Utc;
use maestro_types::error::OrchestrationError;
use maestro_types::workflow::{StepDefinition, StepRequest, Workflow};

/// Validate `request` against `workflow` and append it.
///
/// All checks run before the workflow is touched, so a rejected request
/// leaves the step graph unchanged. Step and dependency names are trimmed
/// alike; duplicate `dependsOn` entries collapse to their first occurrence.
pub fn add_step<'a>(
    workflow: &'a mut Workflow,
    request: StepRequest,
    default_agent_type: &str,
) -> Result<&'a StepDefinition, OrchestrationError> {
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(OrchestrationError::MissingStepName)?
        .to_string();

    if workflow.has_step(&name) {
        return Err(OrchestrationError::DuplicateStep(name));
    }

    let mut seen = HashSet::new();
    let mut depends_on = Vec::new();
    for dep in request.depends_on.unwrap_or_default() {
        let dep = dep.trim().to_string();
        if !workflow.has_step(&dep) {
            return Err(OrchestrationError::InvalidDependency {
                step: name,
                dependency: dep,
            });
        }
        if seen.insert(dep.clone()) {
            depends_on.push(dep);
        }
    }

    let agent_type = request
        .agent_type
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| default_agent_type.to_string());

    workflow.steps.push(StepDefinition {
        name,
        agent_type,
        task: request.task,
        depends_on,
        condition: request.condition.filter(|c| !c.trim().is_empty()),
    });
    workflow.updated_at = Utc::now();

    tracing::debug!(
        workflow_id = %workflow.id,
        steps = workflow.steps.len(),
        "step added"
    );

    // Just pushed, so the last element exists.
    Ok(&workflow.steps[workflow.steps.len() - 1])
}

/// Remove a step and strip its name from every remaining `depends_on`.
///
/// Dependents are kept; only the back-reference is cleaned.
pub fn remove_step(workflow: &mut Workflow, step_name: &str) -> Result<StepDefinition, OrchestrationError> {
    let step_name = step_name.trim();
    if step_name.is_empty() {
        return Err(OrchestrationError::MissingStepName);
    }

    let idx = workflow
        .steps
        .iter()
        .position(|s| s.name == step_name)
        .ok_or_else(|| OrchestrationError::StepNotFound(step_name.to_string()))?;

    let removed = workflow.steps.remove(idx);
    for step in &mut workflow.steps {
        step.depends_on.retain(|dep| dep != step_name);
    }
    workflow.updated_at = Utc::now();

    tracing::debug!(
        workflow_id = %workflow.id,
        step = step_name,
        remaining = workflow.steps.len(),
        "step removed"
    );

    Ok(removed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
