// src/dag/report.rs

//! Aggregated outcome of a flow run.

use std::time::{Duration, Instant};

use crate::errors::{FailedTask, FlowError, Result};
use crate::task::Task;
use crate::types::{TaskId, TaskState};

/// What happened to one task during a run.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub name: String,
    /// Final state; always terminal once the run has returned.
    pub state: TaskState,
    /// When the task entered `Running`, if it ever did.
    pub started: Option<Instant>,
    /// When the body returned (or panicked).
    pub finished: Option<Instant>,
    /// Error reported by the body, or the reason the task was not admitted
    /// to its group, for failed tasks.
    pub error: Option<String>,
    /// The predecessor that prevented this task from running, for skipped
    /// tasks.
    pub blocked_by: Option<TaskId>,
}

impl TaskRecord {
    pub(crate) fn new(task: &Task) -> Self {
        Self {
            task_id: task.id(),
            name: task.name().to_string(),
            state: task.state(),
            started: None,
            finished: None,
            error: None,
            blocked_by: None,
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        match (self.started, self.finished) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }
}

/// Result of [`crate::Flow::run`].
///
/// A run that completes with failing tasks is still `Ok(FlowReport)`; use
/// [`FlowReport::is_success`] or [`FlowReport::ensure_success`] to turn task
/// failures into an error.
#[derive(Debug, Clone)]
pub struct FlowReport {
    /// Wall-clock time of the whole run.
    pub duration: Duration,
    /// One record per task, in the order tasks were issued.
    pub records: Vec<TaskRecord>,
}

impl FlowReport {
    pub fn is_success(&self) -> bool {
        self.records.iter().all(|r| r.state == TaskState::Done)
    }

    pub fn record(&self, id: TaskId) -> Option<&TaskRecord> {
        self.records.iter().find(|r| r.task_id == id)
    }

    pub fn state_of(&self, id: TaskId) -> Option<TaskState> {
        self.record(id).map(|r| r.state)
    }

    pub fn completed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.state == TaskState::Done)
            .count()
    }

    /// Tasks whose body failed.
    pub fn failures(&self) -> Vec<FailedTask> {
        self.records
            .iter()
            .filter(|r| r.state == TaskState::Failed)
            .map(|r| FailedTask {
                task_id: r.task_id,
                name: r.name.clone(),
                error: r.error.clone().unwrap_or_default(),
            })
            .collect()
    }

    /// Tasks that never ran because a predecessor did not complete.
    pub fn skipped(&self) -> Vec<TaskId> {
        self.records
            .iter()
            .filter(|r| r.state == TaskState::Skipped)
            .map(|r| r.task_id)
            .collect()
    }

    /// `Ok(self)` if every task is done, otherwise [`FlowError::TaskFailure`].
    pub fn ensure_success(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(FlowError::TaskFailure {
            failed: self.failures(),
            skipped: self.skipped(),
        })
    }
}
