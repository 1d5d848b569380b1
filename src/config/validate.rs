// src/config/validate.rs

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{FlowFile, RawFlowFile, TaskConfig};
use crate::errors::{FlowError, Result};

impl TryFrom<RawFlowFile> for FlowFile {
    type Error = FlowError;

    fn try_from(raw: RawFlowFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_flow(&raw)?;
        Ok(FlowFile::new_unchecked(raw.group, raw.task))
    }
}

/// Run every check on a raw flow file without consuming it.
pub fn validate_flow(cfg: &RawFlowFile) -> Result<()> {
    validate_raw_flow(cfg)
}

fn validate_raw_flow(cfg: &RawFlowFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_groups(cfg)?;
    validate_task_kinds(cfg)?;
    validate_task_dependencies(cfg)?;
    validate_task_groups(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawFlowFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(FlowError::ConfigError(
            "flow must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_groups(cfg: &RawFlowFile) -> Result<()> {
    for (name, group) in cfg.group.iter() {
        if group.capacity == 0 {
            return Err(FlowError::ConfigError(format!(
                "[group.{}].capacity must be >= 1 (got 0)",
                name
            )));
        }
    }
    Ok(())
}

fn validate_task_kinds(cfg: &RawFlowFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        task.kind()
            .map_err(|msg| FlowError::ConfigError(format!("task '{}': {}", name, msg)))?;
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &RawFlowFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            if dep == name {
                return Err(FlowError::ConfigError(format!(
                    "task '{}' cannot depend on itself in `after`",
                    name
                )));
            }
            if !cfg.task.contains_key(dep) {
                return Err(FlowError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_task_groups(cfg: &RawFlowFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if let Some(group) = &task.group {
            if !cfg.group.contains_key(group) {
                return Err(FlowError::ConfigError(format!(
                    "task '{}' references unknown group '{}'",
                    name, group
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawFlowFile) -> Result<()> {
    match named_toposort(&cfg.task) {
        Ok(_order) => Ok(()),
        Err(node) => Err(FlowError::ConfigError(format!(
            "cycle detected in task DAG involving task '{}'",
            node
        ))),
    }
}

/// Task names in dependency order, or the name of a task on a cycle.
///
/// Edge direction: dep -> task. For `[task.B] after = ["A"]` we add A -> B.
pub(crate) fn named_toposort(
    tasks: &BTreeMap<String, TaskConfig>,
) -> std::result::Result<Vec<&str>, String> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in tasks.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in tasks.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    toposort(&graph, None).map_err(|cycle| cycle.node_id().to_string())
}
