//! The multi-agent orchestration skill.
//!
//! Routes `params.action` to the [`WorkflowService`] and renders every
//! outcome as a [`SkillResponse`]. Request fields are camelCase, with
//! `workflow_id` and `step_name` accepted as aliases. A field of the wrong
//! JSON type is treated as missing.
//!
//! | action             | metadata (beyond `success`, `action`)                      |
//! |--------------------|------------------------------------------------------------|
//! | `create_workflow`  | workflowId, name, mode                                     |
//! | `add_step`         | workflowId, totalSteps, steps                              |
//! | `remove_step`      | workflowId, remainingSteps, steps                          |
//! | `execute_workflow` | workflowId, executionId, mode, totalSteps, executedSteps, skippedSteps, trace |
//! | `get_status`       | workflowId, name, description, mode, stepCount, steps, executionCount, lastExecution |
//! | `list_workflows`   | count, workflows                                           |
//! | `cancel_workflow`  | workflowId, name                                           |

use std::fmt;
use std::str::FromStr;

use maestro_types::error::OrchestrationError;
use maestro_types::skill::{SkillContext, SkillResponse};
use maestro_types::workflow::StepRequest;
use serde_json::{Value, json};

use crate::repository::workflow::WorkflowRepository;
use crate::service::workflow::{WorkflowService, parse_workflow_id};

use super::Skill;

pub const SKILL_NAME: &str = "multi-agent-orchestration";

const SKILL_DESCRIPTION: &str = "Define multi-agent workflows as dependency graphs of steps and \
     execute them sequentially, in parallel dependency levels, or under per-step conditions";

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Operations exposed through `params.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    CreateWorkflow,
    AddStep,
    RemoveStep,
    ExecuteWorkflow,
    GetStatus,
    ListWorkflows,
    CancelWorkflow,
}

impl WorkflowAction {
    pub const ALL: [WorkflowAction; 7] = [
        Self::CreateWorkflow,
        Self::AddStep,
        Self::RemoveStep,
        Self::ExecuteWorkflow,
        Self::GetStatus,
        Self::ListWorkflows,
        Self::CancelWorkflow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateWorkflow => "create_workflow",
            Self::AddStep => "add_step",
            Self::RemoveStep => "remove_step",
            Self::ExecuteWorkflow => "execute_workflow",
            Self::GetStatus => "get_status",
            Self::ListWorkflows => "list_workflows",
            Self::CancelWorkflow => "cancel_workflow",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowAction {
    type Err = OrchestrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| OrchestrationError::UnknownAction(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Request fields
// ---------------------------------------------------------------------------

/// First string value found under any of `keys`. A value of another JSON
/// type reads as absent, so it surfaces as the matching `MISSING_*` error.
fn str_field<'a>(params: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| params.get(*key)).and_then(Value::as_str)
}

fn workflow_id_field(params: &Value) -> Option<&str> {
    str_field(params, &["workflowId", "workflow_id"])
}

/// `mode` is optional, but when present it must name a mode.
fn mode_field(params: &Value) -> Result<Option<&str>, OrchestrationError> {
    match params.get("mode") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(mode)) => Ok(Some(mode.as_str())),
        Some(other) => Err(OrchestrationError::InvalidMode(other.to_string())),
    }
}

/// Read a step object field by field. Non-string entries of `dependsOn`
/// keep their JSON rendering and fail the dependency check.
fn step_request(step: &Value) -> StepRequest {
    fn text(step: &Value, keys: &[&str]) -> Option<String> {
        str_field(step, keys).map(str::to_string)
    }

    let depends_on = ["dependsOn", "depends_on"]
        .iter()
        .find_map(|key| step.get(*key))
        .and_then(Value::as_array)
        .map(|deps| {
            deps.iter()
                .map(|dep| dep.as_str().map_or_else(|| dep.to_string(), str::to_string))
                .collect()
        });

    StepRequest {
        name: text(step, &["name"]),
        agent_type: text(step, &["agentType", "agent_type"]),
        task: text(step, &["task"]),
        depends_on,
        condition: text(step, &["condition"]),
    }
}

// ---------------------------------------------------------------------------
// Skill
// ---------------------------------------------------------------------------

/// Skill adapter over a [`WorkflowService`].
pub struct OrchestrationSkill<R: WorkflowRepository> {
    service: WorkflowService<R>,
}

impl<R: WorkflowRepository> OrchestrationSkill<R> {
    pub fn new(service: WorkflowService<R>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &WorkflowService<R> {
        &self.service
    }

    async fn dispatch(
        &self,
        action: WorkflowAction,
        params: &Value,
    ) -> Result<SkillResponse, OrchestrationError> {
        match action {
            WorkflowAction::CreateWorkflow => self.create_workflow(params),
            WorkflowAction::AddStep => self.add_step(params),
            WorkflowAction::RemoveStep => self.remove_step(params),
            WorkflowAction::ExecuteWorkflow => self.execute_workflow(params).await,
            WorkflowAction::GetStatus => self.get_status(params),
            WorkflowAction::ListWorkflows => Ok(self.list_workflows()),
            WorkflowAction::CancelWorkflow => self.cancel_workflow(params),
        }
    }

    fn create_workflow(&self, params: &Value) -> Result<SkillResponse, OrchestrationError> {
        let name = str_field(params, &["name"]);
        let description = str_field(params, &["description"]).map(str::to_string);
        let mode = mode_field(params)?;
        let workflow = self.service.create_workflow(name, description, mode)?;

        Ok(SkillResponse::success(
            WorkflowAction::CreateWorkflow.as_str(),
            format!(
                "Workflow \"{}\" created with ID {} ({} mode)",
                workflow.name, workflow.id, workflow.mode
            ),
            json!({
                "workflowId": workflow.id,
                "name": workflow.name,
                "mode": workflow.mode,
            }),
        ))
    }

    fn add_step(&self, params: &Value) -> Result<SkillResponse, OrchestrationError> {
        let id = parse_workflow_id(workflow_id_field(params))?;
        let request = params
            .get("step")
            .filter(|step| step.is_object())
            .map(step_request);

        let steps = self.service.add_step(&id, request)?;
        let added = steps.last().map(String::as_str).unwrap_or_default();

        Ok(SkillResponse::success(
            WorkflowAction::AddStep.as_str(),
            format!("Step \"{added}\" added to workflow. Total steps: {}", steps.len()),
            json!({
                "workflowId": id,
                "totalSteps": steps.len(),
                "steps": steps,
            }),
        ))
    }

    fn remove_step(&self, params: &Value) -> Result<SkillResponse, OrchestrationError> {
        let id = parse_workflow_id(workflow_id_field(params))?;
        let step_name = str_field(params, &["stepName", "step_name"]);
        let steps = self.service.remove_step(&id, step_name)?;
        let removed = step_name.map(str::trim).unwrap_or_default();

        Ok(SkillResponse::success(
            WorkflowAction::RemoveStep.as_str(),
            format!("Step \"{removed}\" removed. Remaining steps: {}", steps.len()),
            json!({
                "workflowId": id,
                "remainingSteps": steps.len(),
                "steps": steps,
            }),
        ))
    }

    async fn execute_workflow(&self, params: &Value) -> Result<SkillResponse, OrchestrationError> {
        let id = parse_workflow_id(workflow_id_field(params))?;
        let input = params
            .get("input")
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| json!({}));

        let outcome = self.service.execute_workflow(&id, input).await?;
        let record = &outcome.record;

        Ok(SkillResponse::success(
            WorkflowAction::ExecuteWorkflow.as_str(),
            format!(
                "Workflow executed ({} mode): {}/{} steps completed, {} skipped",
                outcome.mode, record.executed_steps, record.total_steps, record.skipped_steps
            ),
            json!({
                "workflowId": outcome.workflow_id,
                "executionId": record.execution_id,
                "mode": outcome.mode,
                "totalSteps": record.total_steps,
                "executedSteps": record.executed_steps,
                "skippedSteps": record.skipped_steps,
                "trace": record.trace,
            }),
        ))
    }

    fn get_status(&self, params: &Value) -> Result<SkillResponse, OrchestrationError> {
        let id = parse_workflow_id(workflow_id_field(params))?;
        let status = self.service.get_status(&id)?;

        Ok(SkillResponse::success(
            WorkflowAction::GetStatus.as_str(),
            format!(
                "Workflow \"{}\" ({} mode): {} steps, {} executions",
                status.name, status.mode, status.step_count, status.execution_count
            ),
            json!({
                "workflowId": status.workflow_id,
                "name": status.name,
                "description": status.description,
                "mode": status.mode,
                "stepCount": status.step_count,
                "steps": status.steps,
                "executionCount": status.execution_count,
                "lastExecution": status.last_execution,
            }),
        ))
    }

    fn list_workflows(&self) -> SkillResponse {
        let workflows = self.service.list_workflows();
        let result = if workflows.is_empty() {
            "No workflows found".to_string()
        } else {
            let names: Vec<&str> = workflows.iter().map(|w| w.name.as_str()).collect();
            format!("{} workflow(s): {}", workflows.len(), names.join(", "))
        };

        SkillResponse::success(
            WorkflowAction::ListWorkflows.as_str(),
            result,
            json!({
                "count": workflows.len(),
                "workflows": workflows,
            }),
        )
    }

    fn cancel_workflow(&self, params: &Value) -> Result<SkillResponse, OrchestrationError> {
        let id = parse_workflow_id(workflow_id_field(params))?;
        let workflow = self.service.cancel_workflow(&id)?;

        Ok(SkillResponse::success(
            WorkflowAction::CancelWorkflow.as_str(),
            format!("Workflow \"{}\" cancelled and removed", workflow.name),
            json!({
                "workflowId": workflow.id,
                "name": workflow.name,
            }),
        ))
    }
}

impl<R: WorkflowRepository> Skill for OrchestrationSkill<R> {
    fn name(&self) -> &str {
        SKILL_NAME
    }

    fn description(&self) -> &str {
        SKILL_DESCRIPTION
    }

    async fn execute(&self, params: &Value, context: &SkillContext) -> SkillResponse {
        let Some(raw) = params
            .get("action")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|a| !a.is_empty())
        else {
            return SkillResponse::failure(None, &OrchestrationError::MissingAction);
        };

        let action = match raw.parse::<WorkflowAction>() {
            Ok(action) => action,
            Err(e) => return SkillResponse::failure(Some(raw), &e),
        };

        tracing::debug!(
            action = action.as_str(),
            request_id = context.request_id.as_deref().unwrap_or("-"),
            "dispatching skill action"
        );

        match self.dispatch(action, params).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(action = action.as_str(), code = e.code(), "action failed: {e}");
                SkillResponse::failure(Some(action.as_str()), &e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::event::EventBus;
    use crate::workflow::store::InMemoryWorkflowStore;
    use maestro_types::config::OrchestrationConfig;

    fn skill() -> OrchestrationSkill<InMemoryWorkflowStore> {
        OrchestrationSkill::new(WorkflowService::new(
            Arc::new(InMemoryWorkflowStore::new()),
            OrchestrationConfig::default(),
            EventBus::new(64),
        ))
    }

    async fn call(skill: &OrchestrationSkill<InMemoryWorkflowStore>, params: Value) -> SkillResponse {
        skill.execute(&params, &SkillContext::default()).await
    }

    async fn create(skill: &OrchestrationSkill<InMemoryWorkflowStore>, mode: &str) -> String {
        let response = call(
            skill,
            json!({"action": "create_workflow", "name": "pipeline", "mode": mode}),
        )
        .await;
        assert!(response.is_success(), "{response:?}");
        response.metadata["workflowId"].as_str().unwrap().to_string()
    }

    async fn add(
        skill: &OrchestrationSkill<InMemoryWorkflowStore>,
        id: &str,
        step: Value,
    ) -> SkillResponse {
        call(skill, json!({"action": "add_step", "workflowId": id, "step": step})).await
    }

    #[test]
    fn test_actions_round_trip_through_from_str() {
        for action in WorkflowAction::ALL {
            assert_eq!(action.as_str().parse::<WorkflowAction>(), Ok(action));
        }
        assert_eq!(
            "fly".parse::<WorkflowAction>(),
            Err(OrchestrationError::UnknownAction("fly".to_string()))
        );
    }

    #[tokio::test]
    async fn test_skill_identity() {
        let skill = skill();
        assert_eq!(skill.name(), "multi-agent-orchestration");
        assert!(!skill.description().is_empty());
    }

    #[tokio::test]
    async fn test_missing_and_unknown_actions() {
        let skill = skill();

        let response = call(&skill, json!({})).await;
        assert_eq!(response.error_code(), Some("MISSING_ACTION"));
        assert!(response.metadata.get("action").is_none());

        let response = call(&skill, json!({"action": 42})).await;
        assert_eq!(response.error_code(), Some("MISSING_ACTION"));

        let response = call(&skill, json!({"action": "launch_rockets"})).await;
        assert_eq!(response.error_code(), Some("UNKNOWN_ACTION"));
        assert_eq!(response.metadata["action"], "launch_rockets");
        assert!(response.result.starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_create_workflow_reports_id_name_mode() {
        let skill = skill();
        let response = call(
            &skill,
            json!({"action": "create_workflow", "name": "etl", "mode": "parallel"}),
        )
        .await;

        assert!(response.is_success());
        assert_eq!(response.metadata["action"], "create_workflow");
        assert_eq!(response.metadata["name"], "etl");
        assert_eq!(response.metadata["mode"], "parallel");
        assert!(response.result.contains("etl"));

        let response = call(&skill, json!({"action": "create_workflow"})).await;
        assert_eq!(response.error_code(), Some("MISSING_NAME"));

        let response = call(
            &skill,
            json!({"action": "create_workflow", "name": "x", "mode": "Parallel"}),
        )
        .await;
        assert_eq!(response.error_code(), Some("INVALID_MODE"));
    }

    #[tokio::test]
    async fn test_create_workflow_with_mistyped_fields() {
        let skill = skill();

        let response = call(&skill, json!({"action": "create_workflow", "name": 7})).await;
        assert_eq!(response.error_code(), Some("MISSING_NAME"));

        let response = call(&skill, json!({"action": "create_workflow", "name": "etl", "mode": 3})).await;
        assert_eq!(response.error_code(), Some("INVALID_MODE"));

        let response = call(
            &skill,
            json!({"action": "create_workflow", "name": "etl", "description": 42}),
        )
        .await;
        assert!(response.is_success(), "{response:?}");
        let id = response.metadata["workflowId"].as_str().unwrap();
        let status = call(&skill, json!({"action": "get_status", "workflowId": id})).await;
        assert!(status.metadata["description"].is_null());
    }

    #[tokio::test]
    async fn test_non_string_identifiers_read_as_missing() {
        let skill = skill();
        let id = create(&skill, "sequential").await;
        add(&skill, &id, json!({"name": "fetch"})).await;

        let response = call(&skill, json!({"action": "get_status", "workflowId": 123})).await;
        assert_eq!(response.error_code(), Some("MISSING_WORKFLOW_ID"));

        let response = call(&skill, json!({"action": "cancel_workflow", "workflowId": true})).await;
        assert_eq!(response.error_code(), Some("MISSING_WORKFLOW_ID"));

        let response = add(&skill, &id, json!({"name": 5})).await;
        assert_eq!(response.error_code(), Some("MISSING_STEP_NAME"));

        let response = call(
            &skill,
            json!({"action": "remove_step", "workflowId": id, "stepName": 9}),
        )
        .await;
        assert_eq!(response.error_code(), Some("MISSING_STEP_NAME"));

        let response = add(&skill, &id, json!({"name": "parse", "dependsOn": [1]})).await;
        assert_eq!(response.error_code(), Some("INVALID_DEPENDENCY"));

        let status = call(&skill, json!({"action": "get_status", "workflowId": id})).await;
        assert_eq!(status.metadata["stepCount"], 1);
    }

    #[tokio::test]
    async fn test_add_step_validation() {
        let skill = skill();
        let id = create(&skill, "sequential").await;

        let response = call(&skill, json!({"action": "add_step", "step": {"name": "a"}})).await;
        assert_eq!(response.error_code(), Some("MISSING_WORKFLOW_ID"));

        let response = add(&skill, "not-a-uuid", json!({"name": "a"})).await;
        assert_eq!(response.error_code(), Some("WORKFLOW_NOT_FOUND"));

        let response = call(&skill, json!({"action": "add_step", "workflowId": id})).await;
        assert_eq!(response.error_code(), Some("MISSING_STEP"));

        let response = add(&skill, &id, json!("research")).await;
        assert_eq!(response.error_code(), Some("MISSING_STEP"));

        let response = add(&skill, &id, json!({"agentType": "writer"})).await;
        assert_eq!(response.error_code(), Some("MISSING_STEP_NAME"));

        let response = add(&skill, &id, json!({"name": "research"})).await;
        assert!(response.is_success());
        assert_eq!(response.metadata["totalSteps"], 1);
        assert_eq!(response.metadata["steps"], json!(["research"]));

        let response = add(&skill, &id, json!({"name": "research"})).await;
        assert_eq!(response.error_code(), Some("DUPLICATE_STEP"));

        let response = add(&skill, &id, json!({"name": "write", "dependsOn": ["outline"]})).await;
        assert_eq!(response.error_code(), Some("INVALID_DEPENDENCY"));

        let status = call(&skill, json!({"action": "get_status", "workflowId": id})).await;
        assert_eq!(status.metadata["stepCount"], 1);
    }

    #[tokio::test]
    async fn test_snake_case_aliases_are_accepted() {
        let skill = skill();
        let id = create(&skill, "sequential").await;
        add(&skill, &id, json!({"name": "a"})).await;
        add(&skill, &id, json!({"name": "b", "depends_on": ["a"], "agent_type": "writer"})).await;

        let response = call(
            &skill,
            json!({"action": "remove_step", "workflow_id": id, "step_name": "a"}),
        )
        .await;
        assert!(response.is_success(), "{response:?}");
        assert_eq!(response.metadata["remainingSteps"], 1);
        assert_eq!(response.metadata["steps"], json!(["b"]));
    }

    #[tokio::test]
    async fn test_remove_step_strips_back_references() {
        let skill = skill();
        let id = create(&skill, "parallel").await;
        add(&skill, &id, json!({"name": "fetch"})).await;
        add(&skill, &id, json!({"name": "parse", "dependsOn": ["fetch"]})).await;

        let response = call(
            &skill,
            json!({"action": "remove_step", "workflowId": id, "stepName": "ghost"}),
        )
        .await;
        assert_eq!(response.error_code(), Some("STEP_NOT_FOUND"));

        let response = call(&skill, json!({"action": "remove_step", "workflowId": id})).await;
        assert_eq!(response.error_code(), Some("MISSING_STEP_NAME"));

        call(
            &skill,
            json!({"action": "remove_step", "workflowId": id, "stepName": "fetch"}),
        )
        .await;
        let status = call(&skill, json!({"action": "get_status", "workflowId": id})).await;
        assert_eq!(status.metadata["steps"][0]["name"], "parse");
        assert_eq!(status.metadata["steps"][0]["dependsOn"], json!([]));
    }

    #[tokio::test]
    async fn test_get_status_round_trips_dependencies() {
        let skill = skill();
        let id = create(&skill, "parallel").await;
        add(&skill, &id, json!({"name": "fetch", "task": "download"})).await;
        add(&skill, &id, json!({"name": "parse", "dependsOn": ["fetch"]})).await;

        let status = call(&skill, json!({"action": "get_status", "workflowId": id})).await;
        assert!(status.is_success());
        assert_eq!(status.metadata["workflowId"], id.as_str());
        assert_eq!(status.metadata["steps"][1]["dependsOn"], json!(["fetch"]));
        assert_eq!(status.metadata["steps"][0]["agentType"], "default");
        assert_eq!(status.metadata["executionCount"], 0);
        assert!(status.metadata["lastExecution"].is_null());
        assert!(status.metadata["description"].is_null());
    }

    #[tokio::test]
    async fn test_read_actions_are_idempotent() {
        let skill = skill();
        let id = create(&skill, "sequential").await;
        add(&skill, &id, json!({"name": "a"})).await;

        let status = json!({"action": "get_status", "workflowId": id});
        assert_eq!(call(&skill, status.clone()).await, call(&skill, status).await);

        let list = json!({"action": "list_workflows"});
        assert_eq!(call(&skill, list.clone()).await, call(&skill, list).await);
    }

    #[tokio::test]
    async fn test_execute_sequential_chains_research_write_review() {
        let skill = skill();
        let id = create(&skill, "sequential").await;
        add(&skill, &id, json!({"name": "research", "agentType": "researcher", "task": "gather"})).await;
        add(
            &skill,
            &id,
            json!({"name": "write", "agentType": "writer", "task": "draft", "dependsOn": ["research"]}),
        )
        .await;
        add(
            &skill,
            &id,
            json!({"name": "review", "agentType": "editor", "task": "polish", "dependsOn": ["write"]}),
        )
        .await;

        let response = call(
            &skill,
            json!({"action": "execute_workflow", "workflowId": id, "input": {"topic": "rust"}}),
        )
        .await;
        assert!(response.is_success(), "{response:?}");
        let meta = &response.metadata;
        assert_eq!(meta["mode"], "sequential");
        assert_eq!(meta["totalSteps"], 3);
        assert_eq!(meta["executedSteps"], 3);
        assert_eq!(meta["skippedSteps"], 0);

        let trace = meta["trace"].as_array().unwrap();
        assert_eq!(trace[0]["input"], json!({"topic": "rust"}));
        assert_eq!(trace[1]["input"], trace[0]["output"]);
        assert_eq!(
            trace[1]["input"]["simulatedResult"],
            "[Simulated] researcher performed: gather"
        );
        assert_eq!(trace[2]["input"], trace[1]["output"]);
        assert_eq!(
            trace[2]["output"]["simulatedResult"],
            "[Simulated] editor performed: polish"
        );
        assert_eq!(trace[0]["status"], "completed");
    }

    #[tokio::test]
    async fn test_execute_parallel_reports_groups() {
        let skill = skill();
        let id = create(&skill, "parallel").await;
        add(&skill, &id, json!({"name": "fetch"})).await;
        add(&skill, &id, json!({"name": "parse", "dependsOn": ["fetch"]})).await;
        add(&skill, &id, json!({"name": "validate", "dependsOn": ["fetch"]})).await;
        add(&skill, &id, json!({"name": "store", "dependsOn": ["parse", "validate"]})).await;

        let response = call(&skill, json!({"action": "execute_workflow", "workflowId": id})).await;
        let trace = response.metadata["trace"].as_array().unwrap();
        let groups: Vec<u64> = trace
            .iter()
            .map(|r| r["parallelGroup"].as_u64().unwrap())
            .collect();
        assert_eq!(groups, vec![1, 2, 2, 3]);
        assert_eq!(trace[0]["input"], json!({}));
        assert_eq!(
            trace[0]["output"]["simulatedResult"],
            "[Simulated] default performed: (no task specified)"
        );
    }

    #[tokio::test]
    async fn test_execute_conditional_skips_failed_guards() {
        let skill = skill();
        let id = create(&skill, "conditional").await;
        add(&skill, &id, json!({"name": "greet", "condition": "always"})).await;
        add(&skill, &id, json!({"name": "legacy", "condition": "never"})).await;
        add(&skill, &id, json!({"name": "upsell", "condition": "input.tier === \"premium\""})).await;

        let response = call(
            &skill,
            json!({"action": "execute_workflow", "workflowId": id, "input": {"tier": "premium"}}),
        )
        .await;
        let meta = &response.metadata;
        assert_eq!(meta["executedSteps"], 2);
        assert_eq!(meta["skippedSteps"], 1);
        assert_eq!(meta["trace"][1]["status"], "skipped");
        assert_eq!(meta["trace"][1]["conditionMet"], false);
        assert!(meta["trace"][1].get("output").is_none());
        assert_eq!(meta["trace"][2]["conditionMet"], true);

        let response = call(
            &skill,
            json!({"action": "execute_workflow", "workflowId": id, "input": {"tier": "basic"}}),
        )
        .await;
        assert_eq!(response.metadata["executedSteps"], 1);
        assert_eq!(response.metadata["trace"][2]["status"], "skipped");
    }

    #[tokio::test]
    async fn test_execute_empty_workflow_fails() {
        let skill = skill();
        let id = create(&skill, "sequential").await;
        let response = call(&skill, json!({"action": "execute_workflow", "workflowId": id})).await;
        assert_eq!(response.error_code(), Some("NO_STEPS"));
        assert_eq!(response.metadata["action"], "execute_workflow");
    }

    #[tokio::test]
    async fn test_repeated_executions_accumulate_history() {
        let skill = skill();
        let id = create(&skill, "sequential").await;
        add(&skill, &id, json!({"name": "a"})).await;

        let exec = json!({"action": "execute_workflow", "workflowId": id});
        let first = call(&skill, exec.clone()).await;
        let second = call(&skill, exec).await;
        assert_ne!(first.metadata["executionId"], second.metadata["executionId"]);

        let status = call(&skill, json!({"action": "get_status", "workflowId": id})).await;
        assert_eq!(status.metadata["executionCount"], 2);
        assert_eq!(
            status.metadata["lastExecution"]["executionId"],
            second.metadata["executionId"]
        );
    }

    #[tokio::test]
    async fn test_cancel_leaves_other_workflows_untouched() {
        let skill = skill();
        let keep = create(&skill, "sequential").await;
        add(&skill, &keep, json!({"name": "a"})).await;
        add(&skill, &keep, json!({"name": "b", "dependsOn": ["a"]})).await;
        let run = call(&skill, json!({"action": "execute_workflow", "workflowId": keep})).await;
        assert!(run.is_success(), "{run:?}");

        let doomed = create(&skill, "parallel").await;
        add(&skill, &doomed, json!({"name": "x"})).await;
        call(&skill, json!({"action": "execute_workflow", "workflowId": doomed})).await;

        let kept_status = json!({"action": "get_status", "workflowId": keep});
        let before = call(&skill, kept_status.clone()).await;

        let response = call(&skill, json!({"action": "cancel_workflow", "workflowId": doomed})).await;
        assert!(response.is_success());
        assert_eq!(response.metadata["name"], "pipeline");

        let response = call(&skill, json!({"action": "get_status", "workflowId": doomed})).await;
        assert_eq!(response.error_code(), Some("WORKFLOW_NOT_FOUND"));

        let after = call(&skill, kept_status).await;
        assert_eq!(after, before);
        assert_eq!(after.metadata["stepCount"], 2);
        assert_eq!(after.metadata["executionCount"], 1);
        assert_eq!(
            after.metadata["lastExecution"]["executionId"],
            run.metadata["executionId"]
        );

        let list = call(&skill, json!({"action": "list_workflows"})).await;
        assert_eq!(list.metadata["count"], 1);
        assert_eq!(list.metadata["workflows"][0]["id"], keep.as_str());
        assert_eq!(list.metadata["workflows"][0]["stepCount"], 2);
    }

    #[tokio::test]
    async fn test_list_on_empty_store() {
        let response = call(&skill(), json!({"action": "list_workflows"})).await;
        assert!(response.is_success());
        assert_eq!(response.metadata["count"], 0);
        assert_eq!(response.metadata["workflows"], json!([]));
        assert_eq!(response.result, "No workflows found");
    }
}
