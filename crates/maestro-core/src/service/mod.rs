//! Services orchestrating repository access, validation, and execution.

pub mod workflow;
