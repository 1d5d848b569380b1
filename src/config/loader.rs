// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{FlowFile, RawFlowFile};
use crate::errors::Result;

/// Load a flow file from a given path and return the raw `RawFlowFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (DAG correctness, etc.). Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawFlowFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    load_from_str(&contents)
}

/// Parse a flow description from a TOML string.
pub fn load_from_str(contents: &str) -> Result<RawFlowFile> {
    let raw: RawFlowFile = toml::from_str(contents)?;
    Ok(raw)
}

/// Load a flow file from path and run validation.
///
/// Checks for:
/// - at least one task,
/// - group capacities >= 1,
/// - exactly one of `cmd` / `sleep` per task, with parseable durations,
/// - unknown or self `after` references,
/// - unknown group names,
/// - DAG cycles.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<FlowFile> {
    let raw = load_from_path(&path)?;
    FlowFile::try_from(raw)
}

/// Flow file looked up in the current working directory when none is given.
pub const DEFAULT_FLOW_FILE: &str = "Flow.toml";

pub fn default_flow_path() -> PathBuf {
    PathBuf::from(DEFAULT_FLOW_FILE)
}
