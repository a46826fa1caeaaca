//! Observability setup for Maestro: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
