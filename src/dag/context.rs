// src/dag/context.rs

//! Execution context shared by the scheduler and every task wrapper.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::errors::{FlowError, Result};
use crate::group::ConcurrencyGroup;
use crate::notify::StateNotifier;
use crate::task::Task;
use crate::types::TaskState;

/// Everything a run needs besides the graph itself.
///
/// Created by [`crate::Flow`] for each run and passed explicitly down the
/// call chain; nothing here lives in global state.
#[derive(Debug, Clone)]
pub(crate) struct FlowContext {
    groups: Arc<BTreeMap<String, Arc<ConcurrencyGroup>>>,
    notifier: StateNotifier,
}

impl FlowContext {
    pub(crate) fn new(
        groups: BTreeMap<String, Arc<ConcurrencyGroup>>,
        notifier: StateNotifier,
    ) -> Self {
        Self {
            groups: Arc::new(groups),
            notifier,
        }
    }

    pub(crate) fn group(&self, name: &str) -> Option<&Arc<ConcurrencyGroup>> {
        self.groups.get(name)
    }

    /// Move `task` to `next`, publishing the event first.
    ///
    /// The event goes out before the state cell changes so that anything
    /// woken by the new state (a dependent starting) is observed after it.
    pub(crate) fn transition(&self, task: &Task, next: TaskState) -> Result<()> {
        let current = task.state();
        if !current.can_transition_to(next) {
            return Err(FlowError::InvalidTransition {
                task: task.id(),
                from: current,
                to: next,
            });
        }
        debug!(task = %task, id = %task.id(), from = %current, to = %next, "state transition");
        self.notifier.publish(task.id(), next);
        task.set_state(next);
        Ok(())
    }
}
