use thiserror::Error;

/// Errors surfaced by the orchestration skill.
///
/// Every variant maps to a stable machine-readable code (see [`code`]) that
/// is reported in the `metadata.error` field of a failed response.
///
/// [`code`]: OrchestrationError::code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestrationError {
    #[error("action is required")]
    MissingAction,

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("workflow name is required")]
    MissingName,

    #[error("invalid mode '{0}': expected one of sequential | parallel | conditional")]
    InvalidMode(String),

    #[error("workflowId is required")]
    MissingWorkflowId,

    #[error("workflow '{0}' not found")]
    WorkflowNotFound(String),

    #[error("step definition is required")]
    MissingStep,

    #[error("step name is required")]
    MissingStepName,

    #[error("step '{0}' already exists in this workflow")]
    DuplicateStep(String),

    #[error("step '{step}' depends on unknown step '{dependency}'")]
    InvalidDependency { step: String, dependency: String },

    #[error("step '{0}' not found")]
    StepNotFound(String),

    #[error("workflow '{0}' has no steps to execute")]
    NoSteps(String),

    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

impl OrchestrationError {
    /// Stable error code reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAction => "MISSING_ACTION",
            Self::UnknownAction(_) => "UNKNOWN_ACTION",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::MissingName => "MISSING_NAME",
            Self::InvalidMode(_) => "INVALID_MODE",
            Self::MissingWorkflowId => "MISSING_WORKFLOW_ID",
            Self::WorkflowNotFound(_) => "WORKFLOW_NOT_FOUND",
            Self::MissingStep => "MISSING_STEP",
            Self::MissingStepName => "MISSING_STEP_NAME",
            Self::DuplicateStep(_) => "DUPLICATE_STEP",
            Self::InvalidDependency { .. } => "INVALID_DEPENDENCY",
            Self::StepNotFound(_) => "STEP_NOT_FOUND",
            Self::NoSteps(_) => "NO_STEPS",
            Self::ExecutionFailed(_) => "EXECUTION_FAILED",
        }
    }
}
