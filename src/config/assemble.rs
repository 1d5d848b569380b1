// src/config/assemble.rs

//! Turn a validated [`FlowFile`] into a registered [`Flow`].

use std::collections::HashMap;

use tracing::debug;

use crate::config::model::{FlowFile, TaskKind};
use crate::config::validate::named_toposort;
use crate::errors::{FlowError, Result};
use crate::flow::Flow;
use crate::task::Task;
use crate::types::TaskId;

impl FlowFile {
    /// Build a [`Flow`] with every group created and every task registered.
    ///
    /// Tasks are constructed in dependency order, since a task can only
    /// reference predecessors that already have an id.
    pub fn build_flow(&self) -> Result<Flow> {
        let mut flow = Flow::new();

        for (name, group) in self.group.iter() {
            flow.create_group(name.clone(), group.capacity)?;
        }

        let order = named_toposort(&self.task).map_err(|node| {
            FlowError::ConfigError(format!(
                "cycle detected in task DAG involving task '{}'",
                node
            ))
        })?;

        let mut ids: HashMap<&str, TaskId> = HashMap::new();
        let mut tasks = Vec::with_capacity(order.len());

        for name in order {
            let cfg = &self.task[name];
            let kind = cfg
                .kind()
                .map_err(|msg| FlowError::ConfigError(format!("task '{}': {}", name, msg)))?;

            let mut task = match kind {
                TaskKind::Shell(cmd) => Task::shell(name, cmd),
                TaskKind::Sleep(duration) => Task::sleep(name, duration),
            };
            for dep in cfg.after.iter() {
                let dep_id = ids.get(dep.as_str()).copied().ok_or_else(|| {
                    FlowError::ConfigError(format!(
                        "task '{}' has unknown dependency '{}' in `after`",
                        name, dep
                    ))
                })?;
                task = task.after_id(dep_id);
            }
            if let Some(group) = &cfg.group {
                task = task.in_group(group.clone());
            }

            debug!(task = %task, id = %task.id(), "built task from flow file");
            ids.insert(name, task.id());
            tasks.push(task);
        }

        flow.register_tasks(tasks)?;
        Ok(flow)
    }
}
