//! Workflow executor: runs a workflow's steps and builds the execution trace.
//!
//! The `WaveExecutor` walks the execution plan from `dag` one wave at a time.
//!
//! # Modes
//!
//! - **Sequential**: the first step receives the run input; every later step
//!   receives the previous step's output.
//! - **Parallel**: steps of one level run concurrently via `tokio::JoinSet`,
//!   bounded by a semaphore. Level-1 steps receive the run input; deeper
//!   steps receive an object keyed by dependency name holding each
//!   dependency's output. Results are re-ordered by insertion order before
//!   they enter the trace, so traces are deterministic.
//! - **Conditional**: every step's condition is evaluated against the
//!   original run input, and every step receives that input. Steps whose
//!   condition fails are recorded as skipped.
//!
//! The executor never touches the store; it works on a snapshot and returns
//! the trace for the caller to persist.

use std::collections::HashMap;
use std::sync::Arc;

use maestro_types::error::OrchestrationError;
use maestro_types::event::WorkflowEvent;
use maestro_types::workflow::{
    ExecutionId, ExecutionMode, StepDefinition, StepResult, Workflow,
};
use serde_json::{Map, Value};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::event::EventBus;

use super::agent::AgentInvoker;
use super::dag::build_execution_plan;
use super::expression::evaluate_condition;

/// Executes workflow snapshots wave by wave.
pub struct WaveExecutor {
    invoker: Arc<dyn AgentInvoker>,
    event_bus: EventBus,
    max_parallel_steps: usize,
}

impl WaveExecutor {
    pub fn new(invoker: Arc<dyn AgentInvoker>, event_bus: EventBus, max_parallel_steps: usize) -> Self {
        Self {
            invoker,
            event_bus,
            max_parallel_steps: max_parallel_steps.max(1),
        }
    }

    /// Run every step of `workflow` and return the ordered trace.
    pub async fn run(
        &self,
        workflow: &Workflow,
        execution_id: ExecutionId,
        input: &Value,
    ) -> Result<Vec<StepResult>, OrchestrationError> {
        if workflow.steps.is_empty() {
            return Err(OrchestrationError::NoSteps(workflow.id.to_string()));
        }

        match workflow.mode {
            ExecutionMode::Sequential => Ok(self.run_sequential(workflow, execution_id, input)),
            ExecutionMode::Parallel => self.run_parallel(workflow, execution_id, input).await,
            ExecutionMode::Conditional => Ok(self.run_conditional(workflow, execution_id, input)),
        }
    }

    fn run_sequential(
        &self,
        workflow: &Workflow,
        execution_id: ExecutionId,
        input: &Value,
    ) -> Vec<StepResult> {
        let plan = build_execution_plan(ExecutionMode::Sequential, &workflow.steps);
        let mut trace: Vec<StepResult> = Vec::with_capacity(workflow.steps.len());
        let mut current = input.clone();

        for step in plan.into_iter().flatten() {
            let order = trace.len() + 1;
            let output = self.invoker.invoke(step, &current);
            self.publish_completed(workflow, execution_id, step, order, None);

            let step_input = std::mem::replace(&mut current, output.clone());
            trace.push(StepResult::completed(step, order, step_input, output));
        }

        trace
    }

    async fn run_parallel(
        &self,
        workflow: &Workflow,
        execution_id: ExecutionId,
        input: &Value,
    ) -> Result<Vec<StepResult>, OrchestrationError> {
        let waves = build_execution_plan(ExecutionMode::Parallel, &workflow.steps);
        let semaphore = Arc::new(Semaphore::new(self.max_parallel_steps));
        let mut outputs: HashMap<String, Value> = HashMap::with_capacity(workflow.steps.len());
        let mut trace: Vec<StepResult> = Vec::with_capacity(workflow.steps.len());

        for (wave_idx, wave) in waves.iter().enumerate() {
            let group = wave_idx + 1;
            tracing::debug!(
                workflow_id = %workflow.id,
                execution_id = %execution_id,
                group,
                steps = wave.len(),
                "processing parallel group"
            );

            let mut join_set = JoinSet::new();
            for (position, step) in wave.iter().enumerate() {
                let step_input = if step.depends_on.is_empty() {
                    input.clone()
                } else {
                    dependency_input(step, &outputs)
                };
                let step = (*step).clone();
                let invoker = Arc::clone(&self.invoker);
                let semaphore = Arc::clone(&semaphore);

                join_set.spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| OrchestrationError::ExecutionFailed(e.to_string()))?;
                    let output = invoker.invoke(&step, &step_input);
                    Ok::<_, OrchestrationError>((position, step, step_input, output))
                });
            }

            let mut finished = Vec::with_capacity(wave.len());
            while let Some(joined) = join_set.join_next().await {
                let result = joined.map_err(|e| {
                    OrchestrationError::ExecutionFailed(format!("task join error: {e}"))
                })??;
                finished.push(result);
            }
            finished.sort_by_key(|(position, ..)| *position);

            for (_, step, step_input, output) in finished {
                let order = trace.len() + 1;
                self.publish_completed(workflow, execution_id, &step, order, Some(group));
                outputs.insert(step.name.clone(), output.clone());
                trace.push(
                    StepResult::completed(&step, order, step_input, output).with_parallel_group(group),
                );
            }
        }

        Ok(trace)
    }

    fn run_conditional(
        &self,
        workflow: &Workflow,
        execution_id: ExecutionId,
        input: &Value,
    ) -> Vec<StepResult> {
        let plan = build_execution_plan(ExecutionMode::Conditional, &workflow.steps);
        let mut trace: Vec<StepResult> = Vec::with_capacity(workflow.steps.len());

        for step in plan.into_iter().flatten() {
            let order = trace.len() + 1;
            let condition_met = evaluate_condition(step.condition.as_deref(), input);

            let result = if condition_met {
                let output = self.invoker.invoke(step, input);
                self.publish_completed(workflow, execution_id, step, order, None);
                StepResult::completed(step, order, input.clone(), output)
            } else {
                tracing::debug!(
                    execution_id = %execution_id,
                    step = step.name.as_str(),
                    "condition not met, skipping step"
                );
                self.event_bus.publish(WorkflowEvent::StepSkipped {
                    workflow_id: workflow.id,
                    execution_id,
                    step_name: step.name.clone(),
                    order,
                });
                StepResult::skipped(step, order, input.clone())
            };

            trace.push(result.with_condition_met(condition_met));
        }

        trace
    }

    fn publish_completed(
        &self,
        workflow: &Workflow,
        execution_id: ExecutionId,
        step: &StepDefinition,
        order: usize,
        parallel_group: Option<usize>,
    ) {
        self.event_bus.publish(WorkflowEvent::StepCompleted {
            workflow_id: workflow.id,
            execution_id,
            step_name: step.name.clone(),
            order,
            parallel_group,
        });
    }
}

/// Input for a step below level 1: each dependency's output keyed by name.
fn dependency_input(step: &StepDefinition, outputs: &HashMap<String, Value>) -> Value {
    let mut map = Map::new();
    for dep in &step.depends_on {
        if let Some(output) = outputs.get(dep) {
            map.insert(dep.clone(), output.clone());
        }
    }
    Value::Object(map)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::agent::SimulatedAgent;
    use serde_json::json;

    fn step(name: &str, agent: &str, depends_on: Vec<&str>, condition: Option<&str>) -> StepDefinition {
        StepDefinition {
            name: name.to_string(),
            agent_type: agent.to_string(),
            task: Some(format!("{name} task")),
            depends_on: depends_on.into_iter().map(String::from).collect(),
            condition: condition.map(String::from),
        }
    }

    fn workflow(mode: ExecutionMode, steps: Vec<StepDefinition>) -> Workflow {
        let mut wf = Workflow::new("test".to_string(), None, mode);
        wf.steps = steps;
        wf
    }

    fn executor() -> WaveExecutor {
        WaveExecutor::new(Arc::new(SimulatedAgent), EventBus::new(64), 4)
    }

    fn names(trace: &[StepResult]) -> Vec<&str> {
        trace.iter().map(|r| r.step_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_empty_workflow_fails_with_no_steps() {
        let wf = workflow(ExecutionMode::Sequential, vec![]);
        let err = executor().run(&wf, ExecutionId::new(), &json!({})).await.unwrap_err();
        assert_eq!(err.code(), "NO_STEPS");
    }

    #[tokio::test]
    async fn test_sequential_chains_outputs() {
        let wf = workflow(
            ExecutionMode::Sequential,
            vec![
                step("research", "researcher", vec![], None),
                step("write", "writer", vec!["research"], None),
                step("review", "editor", vec!["write"], None),
            ],
        );
        let input = json!({"topic": "rust"});
        let trace = executor().run(&wf, ExecutionId::new(), &input).await.unwrap();

        assert_eq!(names(&trace), vec!["research", "write", "review"]);
        assert_eq!(trace.iter().map(|r| r.order).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(trace[0].input, input);
        assert_eq!(&trace[1].input, trace[0].output().unwrap());
        assert_eq!(
            trace[1].input["simulatedResult"],
            "[Simulated] researcher performed: research task"
        );
        assert_eq!(&trace[2].input, trace[1].output().unwrap());
        assert!(trace.iter().all(|r| r.parallel_group.is_none() && r.condition_met.is_none()));
    }

    #[tokio::test]
    async fn test_sequential_ignores_conditions() {
        let wf = workflow(
            ExecutionMode::Sequential,
            vec![step("only", "default", vec![], Some("never"))],
        );
        let trace = executor().run(&wf, ExecutionId::new(), &json!({})).await.unwrap();
        assert!(trace[0].is_completed());
    }

    #[tokio::test]
    async fn test_parallel_assigns_groups_and_dependency_inputs() {
        let wf = workflow(
            ExecutionMode::Parallel,
            vec![
                step("fetch", "fetcher", vec![], None),
                step("parse", "parser", vec!["fetch"], None),
                step("validate", "validator", vec!["fetch"], None),
                step("store", "writer", vec!["parse", "validate"], None),
            ],
        );
        let input = json!({"url": "https://example.com"});
        let trace = executor().run(&wf, ExecutionId::new(), &input).await.unwrap();

        assert_eq!(names(&trace), vec!["fetch", "parse", "validate", "store"]);
        assert_eq!(
            trace.iter().map(|r| r.parallel_group).collect::<Vec<_>>(),
            vec![Some(1), Some(2), Some(2), Some(3)]
        );
        assert_eq!(trace.iter().map(|r| r.order).collect::<Vec<_>>(), vec![1, 2, 3, 4]);

        assert_eq!(trace[0].input, input);
        assert_eq!(&trace[1].input["fetch"], trace[0].output().unwrap());
        assert_eq!(&trace[3].input["parse"], trace[1].output().unwrap());
        assert_eq!(&trace[3].input["validate"], trace[2].output().unwrap());
        assert!(trace[3].input.get("fetch").is_none());
    }

    #[tokio::test]
    async fn test_parallel_wide_level_keeps_insertion_order() {
        let mut steps = vec![step("root", "default", vec![], None)];
        for i in (0..20).rev() {
            steps.push(step(&format!("leaf{i:02}"), "default", vec!["root"], None));
        }
        let wf = workflow(ExecutionMode::Parallel, steps);
        let trace = WaveExecutor::new(Arc::new(SimulatedAgent), EventBus::new(64), 3)
            .run(&wf, ExecutionId::new(), &json!({}))
            .await
            .unwrap();

        let expected: Vec<String> = std::iter::once("root".to_string())
            .chain((0..20).rev().map(|i| format!("leaf{i:02}")))
            .collect();
        let actual: Vec<String> = trace.iter().map(|r| r.step_name.clone()).collect();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_conditional_evaluates_against_original_input() {
        let wf = workflow(
            ExecutionMode::Conditional,
            vec![
                step("intro", "default", vec![], Some("always")),
                step("upsell", "sales", vec!["intro"], Some(r#"input.tier === "premium""#)),
                step("legacy", "default", vec![], Some("never")),
                step("wrapup", "default", vec!["upsell"], None),
            ],
        );

        let premium = json!({"tier": "premium"});
        let trace = executor().run(&wf, ExecutionId::new(), &premium).await.unwrap();
        let statuses: Vec<&str> = trace.iter().map(|r| r.status_str()).collect();
        assert_eq!(statuses, vec!["completed", "completed", "skipped", "completed"]);
        assert_eq!(trace[1].condition_met, Some(true));
        assert_eq!(trace[2].condition_met, Some(false));
        assert_eq!(trace[3].condition_met, Some(true));
        assert!(trace.iter().all(|r| r.input == premium));
        assert!(trace[2].output().is_none());

        let basic = json!({"tier": "basic"});
        let trace = executor().run(&wf, ExecutionId::new(), &basic).await.unwrap();
        assert_eq!(trace[1].condition_met, Some(false));
        assert!(!trace[1].is_completed());
    }

    #[tokio::test]
    async fn test_events_are_published_per_step() {
        let bus = EventBus::new(64);
        let mut rx = bus.subscribe();
        let exec = WaveExecutor::new(Arc::new(SimulatedAgent), bus, 2);
        let wf = workflow(
            ExecutionMode::Conditional,
            vec![
                step("a", "default", vec![], None),
                step("b", "default", vec![], Some("never")),
            ],
        );
        exec.run(&wf, ExecutionId::new(), &json!({})).await.unwrap();

        assert!(matches!(rx.try_recv().unwrap(), WorkflowEvent::StepCompleted { order: 1, .. }));
        assert!(matches!(rx.try_recv().unwrap(), WorkflowEvent::StepSkipped { order: 2, .. }));
    }
}
