//! Repository trait definitions (ports).
//!
//! The engine talks to storage only through these traits, so tests and hosts
//! can supply their own store instances.

pub mod workflow;
