// src/config/mod.rs

//! Flow files: TOML descriptions of tasks and groups.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a flow file from disk (`loader.rs`).
//! - Validate dependencies, groups and DAG correctness (`validate.rs`).
//! - Build a runnable [`crate::Flow`] from a validated file (`assemble.rs`).

pub mod assemble;
pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{
    DEFAULT_FLOW_FILE, default_flow_path, load_and_validate, load_from_path, load_from_str,
};
pub use model::{FlowFile, GroupConfig, RawFlowFile, TaskConfig, TaskKind};
pub use validate::validate_flow;
