//! Skill contract and the orchestration skill.
//!
//! A skill is invoked by an agent runtime with a JSON parameter object and a
//! [`SkillContext`], and always answers with a [`SkillResponse`] envelope.
//! Failures are reported inside the envelope, never as a Rust error.

use std::future::Future;

use maestro_types::skill::{SkillContext, SkillResponse};
use serde_json::Value;

pub mod orchestration;

pub use orchestration::OrchestrationSkill;

/// Trait implemented by every skill the runtime can host.
pub trait Skill: Send + Sync {
    /// Stable identifier the runtime dispatches on.
    fn name(&self) -> &str;

    /// One-line description shown to the agent.
    fn description(&self) -> &str;

    /// Handle one invocation.
    fn execute(
        &self,
        params: &Value,
        context: &SkillContext,
    ) -> impl Future<Output = SkillResponse> + Send;
}
