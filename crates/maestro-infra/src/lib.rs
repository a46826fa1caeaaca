//! Infrastructure layer for Maestro.
//!
//! Everything that touches the host environment: the `config.toml` loader
//! and data directory resolution. The workflow store itself is in-memory and
//! lives in `maestro-core`.

pub mod config;
pub mod filesystem;
