//! Workflow engine core: step graph, leveling, condition evaluation, execution.
//!
//! - `store` -- in-memory `WorkflowRepository` implementation
//! - `graph` -- validated step insertion and removal
//! - `dag` -- dependency levels and execution plans
//! - `expression` -- closed-grammar condition evaluator
//! - `agent` -- agent invocation seam and the simulated agent
//! - `executor` -- wave executor for all three modes

pub mod agent;
pub mod dag;
pub mod executor;
pub mod expression;
pub mod graph;
pub mod store;
