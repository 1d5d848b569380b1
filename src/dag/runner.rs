// src/dag/runner.rs

//! Per-task unit of work launched by the scheduler.
//!
//! This is the only place where task state changes and group slots are
//! taken or given back; task bodies never touch either.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::dag::context::FlowContext;
use crate::dag::report::TaskRecord;
use crate::group::GroupPermit;
use crate::task::{Task, TaskError};
use crate::types::{TaskId, TaskState};

/// Completion signal of one predecessor.
pub(crate) struct Predecessor {
    pub id: TaskId,
    pub state: watch::Receiver<TaskState>,
}

/// Wait for every predecessor to settle, then run or skip `task`.
pub(crate) async fn run_when_ready(
    task: Arc<Task>,
    predecessors: Vec<Predecessor>,
    ctx: FlowContext,
) -> TaskRecord {
    let span = info_span!("task", task = %task.name(), id = %task.id());

    async move {
        match wait_ready(predecessors).await {
            None => run_task(task, &ctx).await,
            Some(blocked_by) => skip_task(&task, blocked_by, &ctx),
        }
    }
    .instrument(span)
    .await
}

/// Returns the first predecessor that ended in anything but `Done`.
async fn wait_ready(predecessors: Vec<Predecessor>) -> Option<TaskId> {
    for mut pred in predecessors {
        let state = pred
            .state
            .wait_for(|s| s.is_terminal())
            .await
            .map(|s| *s)
            .unwrap_or(TaskState::Failed);

        if state != TaskState::Done {
            return Some(pred.id);
        }
    }
    None
}

fn skip_task(task: &Task, blocked_by: TaskId, ctx: &FlowContext) -> TaskRecord {
    warn!(blocked_by = %blocked_by, "predecessor did not complete; skipping task");
    if let Err(err) = ctx.transition(task, TaskState::Skipped) {
        warn!(error = %err, "could not mark task as skipped");
    }
    let mut record = TaskRecord::new(task);
    record.blocked_by = Some(blocked_by);
    record
}

async fn run_task(task: Arc<Task>, ctx: &FlowContext) -> TaskRecord {
    let permit = match admit(&task, ctx).await {
        Ok(permit) => permit,
        Err(err) => return reject_task(&task, err, ctx),
    };

    if let Err(err) = ctx.transition(&task, TaskState::Running) {
        warn!(error = %err, "could not mark task as running");
        return TaskRecord::new(&task);
    }
    let started = Instant::now();
    info!(group = task.group().unwrap_or("-"), "running task");

    // The body runs in its own tokio task so a panic surfaces as a JoinError
    // instead of tearing down this wrapper.
    let body = task.body();
    let outcome = match tokio::spawn(async move { body.execute().await }).await {
        Ok(res) => res,
        Err(join_err) => Err(TaskError::Panicked(panic_message(join_err))),
    };
    let finished = Instant::now();

    let (next, error) = match outcome {
        Ok(()) => {
            info!(elapsed = ?finished.duration_since(started), "task done");
            (TaskState::Done, None)
        }
        Err(err) => {
            warn!(error = %err, "task failed");
            (TaskState::Failed, Some(err.to_string()))
        }
    };

    if let Err(err) = ctx.transition(&task, next) {
        warn!(error = %err, "could not record task outcome");
    }

    if let Some(permit) = permit {
        permit.release();
    }

    let mut record = TaskRecord::new(&task);
    record.started = Some(started);
    record.finished = Some(finished);
    record.error = error;
    record
}

/// The task could not get into its group: it fails without ever running.
fn reject_task(task: &Task, err: TaskError, ctx: &FlowContext) -> TaskRecord {
    warn!(error = %err, "task not admitted to its group");
    if let Err(err) = ctx.transition(task, TaskState::Failed) {
        warn!(error = %err, "could not mark task as failed");
    }
    let mut record = TaskRecord::new(task);
    record.error = Some(err.to_string());
    record
}

/// Take a slot in the task's group, if it has one.
async fn admit(task: &Task, ctx: &FlowContext) -> Result<Option<GroupPermit>, TaskError> {
    let Some(name) = task.group() else {
        return Ok(None);
    };
    let group = ctx
        .group(name)
        .ok_or_else(|| TaskError::failed(format!("unknown concurrency group '{name}'")))?;

    debug!(group = %name, active = group.active(), capacity = group.capacity(), "waiting for group slot");
    group
        .acquire()
        .await
        .map(Some)
        .map_err(|err| TaskError::failed(err.to_string()))
}

fn panic_message(err: tokio::task::JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
