//! Dependency leveling and execution plan construction.
//!
//! Steps are stored in insertion order and may only depend on earlier
//! steps, so a single forward pass computes every level:
//!
//! - `level(step) = 1` when `depends_on` is empty
//! - `level(step) = 1 + max(level(dep))` otherwise
//!
//! Parallel workflows group steps into waves by level. Sequential and
//! conditional workflows run one step per wave in insertion order.

use std::collections::HashMap;

use maestro_types::workflow::{ExecutionMode, StepDefinition};

/// Compute the 1-based dependency level of every step, keyed by name.
///
/// A dependency that does not name an earlier step contributes nothing
/// (the step is treated as if that edge were absent).
pub fn compute_levels(steps: &[StepDefinition]) -> HashMap<&str, usize> {
    let mut levels: HashMap<&str, usize> = HashMap::with_capacity(steps.len());
    for step in steps {
        let level = step
            .depends_on
            .iter()
            .filter_map(|dep| levels.get(dep.as_str()).copied())
            .max()
            .map_or(1, |deepest| deepest + 1);
        levels.insert(step.name.as_str(), level);
    }
    levels
}

/// Build the execution plan for `mode`.
///
/// Returns waves in execution order; index 0 is the first wave. Within a
/// wave, steps keep their insertion order. An empty step list yields an
/// empty plan.
pub fn build_execution_plan(
    mode: ExecutionMode,
    steps: &[StepDefinition],
) -> Vec<Vec<&StepDefinition>> {
    match mode {
        ExecutionMode::Sequential | ExecutionMode::Conditional => {
            steps.iter().map(|step| vec![step]).collect()
        }
        ExecutionMode::Parallel => {
            let levels = compute_levels(steps);
            let max_level = levels.values().copied().max().unwrap_or(0);
            let mut waves: Vec<Vec<&StepDefinition>> = vec![Vec::new(); max_level];
            for step in steps {
                let level = levels[step.name.as_str()];
                waves[level - 1].push(step);
            }
            waves
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
