//! CLI command definitions for the `maestro` binary.
//!
//! The binary hosts the orchestration skill: requests are JSON objects such
//! as `{"action": "create_workflow", "name": "etl"}` and every request is
//! answered with one `{result, metadata}` envelope on stdout.

pub mod host;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Define and run multi-agent workflows.
#[derive(Parser)]
#[command(name = "maestro", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to <data-dir>/config.toml).
    #[arg(long, global = true, env = "MAESTRO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory (defaults to $MAESTRO_DATA_DIR, then ~/.maestro).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Pretty-print response envelopes.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Suppress all logging except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed logging on stderr (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single JSON request and print its envelope.
    Exec {
        /// Request object, e.g. '{"action":"list_workflows"}'.
        request: String,
    },

    /// Run every non-blank line of a JSONL file against one shared store.
    Batch {
        /// Path to the JSONL file.
        file: PathBuf,
    },

    /// Serve line-delimited JSON requests on stdin, envelopes on stdout.
    Stdio {
        /// Echo workflow events to stderr.
        #[arg(long)]
        events: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Cli {
    /// Log filter derived from `--quiet` and `-v`.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,maestro_core=debug",
            _ => "trace",
        }
    }
}
