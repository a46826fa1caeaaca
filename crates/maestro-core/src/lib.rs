//! Business logic and repository trait definitions for Maestro.
//!
//! This crate holds the orchestration engine (store, step graph, leveler,
//! condition evaluator, executor) and the skill that exposes it to an agent
//! runtime. It depends only on `maestro-types` -- never on `maestro-infra`.

pub mod event;
pub mod repository;
pub mod service;
pub mod skill;
pub mod workflow;
