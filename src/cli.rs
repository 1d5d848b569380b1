// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{DEFAULT_FLOW_FILE, default_flow_path};

/// Command-line arguments for `flowdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "flowdag",
    version,
    about = "Run a DAG of tasks with dependencies and concurrency groups.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the flow file (TOML).
    ///
    /// Default: `Flow.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_FLOW_FILE)]
    pub flow: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FLOWDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the execution order, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Don't print state transitions while the flow runs.
    #[arg(long, short)]
    pub quiet: bool,
}

impl CliArgs {
    /// The flow file to load, falling back to [`default_flow_path`] when
    /// `--flow` is empty.
    pub fn flow_path(&self) -> PathBuf {
        if self.flow.trim().is_empty() {
            default_flow_path()
        } else {
            PathBuf::from(&self.flow)
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
