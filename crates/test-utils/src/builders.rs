#![allow(dead_code)]

use flowdag::config::{FlowFile, GroupConfig, RawFlowFile, TaskConfig};

/// Builder for `FlowFile` to simplify test setup.
pub struct FlowFileBuilder {
    raw: RawFlowFile,
}

impl FlowFileBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawFlowFile::default(),
        }
    }

    pub fn with_group(mut self, name: &str, capacity: usize) -> Self {
        self.raw
            .group
            .insert(name.to_string(), GroupConfig { capacity });
        self
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.raw.task.insert(name.to_string(), task);
        self
    }

    /// The unvalidated file, for tests that expect validation to fail.
    pub fn build_raw(self) -> RawFlowFile {
        self.raw
    }

    pub fn build(self) -> FlowFile {
        FlowFile::try_from(self.raw).expect("Failed to build valid flow file from builder")
    }
}

impl Default for FlowFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    /// A task running `cmd` through the shell.
    pub fn cmd(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: Some(cmd.to_string()),
                ..TaskConfig::default()
            },
        }
    }

    /// A task sleeping for `duration` (e.g. `"20ms"`).
    pub fn sleep(duration: &str) -> Self {
        Self {
            task: TaskConfig {
                sleep: Some(duration.to_string()),
                ..TaskConfig::default()
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.task.group = Some(group.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
