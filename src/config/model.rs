// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::config::duration::parse_duration;

/// Flow description as read from a TOML file, before validation.
///
/// ```toml
/// [group.workers]
/// capacity = 2
///
/// [task.preprocess]
/// cmd = "ls -la"
///
/// [task.A]
/// sleep = "10s"
/// after = ["preprocess"]
/// group = "workers"
/// ```
///
/// Both sections are optional at the TOML level; validation requires at
/// least one task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFlowFile {
    /// Concurrency groups from `[group.<name>]`.
    #[serde(default)]
    pub group: BTreeMap<String, GroupConfig>,

    /// Tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// A validated flow file.
///
/// Only constructible through `TryFrom<RawFlowFile>`, which checks
/// dependencies, groups, task kinds and acyclicity.
#[derive(Debug, Clone)]
pub struct FlowFile {
    pub group: BTreeMap<String, GroupConfig>,
    pub task: BTreeMap<String, TaskConfig>,
}

impl FlowFile {
    pub(crate) fn new_unchecked(
        group: BTreeMap<String, GroupConfig>,
        task: BTreeMap<String, TaskConfig>,
    ) -> Self {
        Self { group, task }
    }
}

/// `[group.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    /// Maximum number of tasks of this group running at the same time.
    pub capacity: usize,
}

/// `[task.<name>]` section.
///
/// Exactly one of `cmd` or `sleep` must be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    /// Shell command to run.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Fixed delay such as `"500ms"` or `"3s"`.
    #[serde(default)]
    pub sleep: Option<String>,

    /// Names of tasks that must be done before this one starts.
    #[serde(default)]
    pub after: Vec<String>,

    /// Concurrency group name, if any.
    #[serde(default)]
    pub group: Option<String>,
}

/// What a configured task does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Shell(String),
    Sleep(Duration),
}

impl TaskConfig {
    /// Resolve `cmd` / `sleep` into a [`TaskKind`].
    pub fn kind(&self) -> Result<TaskKind, String> {
        match (&self.cmd, &self.sleep) {
            (Some(cmd), None) => Ok(TaskKind::Shell(cmd.clone())),
            (None, Some(sleep)) => parse_duration(sleep).map(TaskKind::Sleep),
            (Some(_), Some(_)) => Err("set either `cmd` or `sleep`, not both".to_string()),
            (None, None) => Err("one of `cmd` or `sleep` is required".to_string()),
        }
    }
}
