// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::fmt;

use thiserror::Error;

use crate::types::{TaskId, TaskState};

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Concurrency group '{0}' already exists")]
    DuplicateGroup(String),

    #[error("Concurrency group '{name}' must have capacity >= 1 (got {capacity})")]
    InvalidCapacity { name: String, capacity: usize },

    #[error("Concurrency group '{0}' is closed")]
    GroupClosed(String),

    #[error("No registered task with id {0}")]
    NotFound(TaskId),

    #[error("Cyclic dependency detected involving task {0}")]
    CyclicDependency(TaskId),

    #[error("Task '{task}' depends on unregistered task {dependency}")]
    UnregisteredDependency { task: String, dependency: TaskId },

    #[error("Task '{task}' references unknown concurrency group '{group}'")]
    UnknownGroup { task: String, group: String },

    #[error("Invalid state transition for task {task}: {from} -> {to}")]
    InvalidTransition {
        task: TaskId,
        from: TaskState,
        to: TaskState,
    },

    #[error("Flow has already been run")]
    AlreadyRun,

    #[error("{}", describe_failures(.failed, .skipped))]
    TaskFailure {
        failed: Vec<FailedTask>,
        skipped: Vec<TaskId>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A task whose body returned an error (or panicked) during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTask {
    pub task_id: TaskId,
    pub name: String,
    pub error: String,
}

impl fmt::Display for FailedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.name, self.task_id, self.error)
    }
}

fn describe_failures(failed: &[FailedTask], skipped: &[TaskId]) -> String {
    let details = failed
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    format!(
        "{} task(s) failed, {} task(s) skipped: {}",
        failed.len(),
        skipped.len(),
        details
    )
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FlowError>;
