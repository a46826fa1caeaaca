//! Shared domain types for Maestro.
//!
//! This crate contains the types shared by every layer of the orchestration
//! skill: workflows, steps, execution records, the skill response envelope,
//! the error taxonomy, events, and configuration.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, uuid, chrono,
//! thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod skill;
pub mod workflow;
