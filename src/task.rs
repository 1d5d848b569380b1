// src/task.rs

//! Tasks and the task-body capability.
//!
//! A [`Task`] pairs identity and wiring (name, predecessors, optional
//! concurrency group) with a [`TaskBody`] that does the actual work. The body
//! never sees state or groups; the run wrapper in [`crate::dag::runner`]
//! drives every transition.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

use crate::exec::{FnTask, ShellTask, SleepTask};
use crate::types::{TaskId, TaskState};

/// Boxed, sendable future returned by [`TaskBody::execute`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors a task body can report.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("command exited with code {0}")]
    CommandFailed(i32),

    #[error("execution failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    pub fn failed(msg: impl Into<String>) -> Self {
        TaskError::Failed(msg.into())
    }
}

/// The one capability a concrete task kind has to provide.
///
/// Implementations are free to do anything asynchronous inside `execute`;
/// returning `Err` marks the task as failed and blocks its dependents.
pub trait TaskBody: Send + Sync {
    fn execute(&self) -> BoxFuture<'_, Result<(), TaskError>>;

    /// Short label used in logs and in `Display` for [`Task`].
    fn kind(&self) -> &'static str {
        "task"
    }
}

/// A named unit of work with declared predecessors.
///
/// Predecessors are held by id and resolved against the owning
/// [`crate::Flow`] at registration time. The state cell is a `watch`
/// channel, which doubles as the completion signal dependents wait on.
pub struct Task {
    id: TaskId,
    name: String,
    dependencies: Vec<TaskId>,
    group: Option<String>,
    body: Arc<dyn TaskBody>,
    state: watch::Sender<TaskState>,
}

impl Task {
    pub fn new(name: impl Into<String>, body: impl TaskBody + 'static) -> Self {
        let (state, _) = watch::channel(TaskState::Pending);
        Self {
            id: TaskId::next(),
            name: name.into(),
            dependencies: Vec::new(),
            group: None,
            body: Arc::new(body),
            state,
        }
    }

    /// Task that runs `cmd` through the platform shell.
    pub fn shell(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self::new(name, ShellTask::new(cmd))
    }

    /// Task that sleeps for a fixed duration.
    pub fn sleep(name: impl Into<String>, duration: Duration) -> Self {
        Self::new(name, SleepTask::new(duration))
    }

    /// Task backed by a closure producing a future.
    pub fn from_fn<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self::new(name, FnTask::new(f))
    }

    /// Declare that this task runs only after `other` is done.
    pub fn after(self, other: &Task) -> Self {
        self.after_id(other.id)
    }

    pub fn after_id(mut self, id: TaskId) -> Self {
        if !self.dependencies.contains(&id) {
            self.dependencies.push(id);
        }
        self
    }

    pub fn after_all<'a>(mut self, others: impl IntoIterator<Item = &'a Task>) -> Self {
        for other in others {
            self = self.after(other);
        }
        self
    }

    /// Assign this task to a concurrency group by name.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared predecessors, in declaration order.
    pub fn dependencies(&self) -> &[TaskId] {
        &self.dependencies
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn kind(&self) -> &'static str {
        self.body.kind()
    }

    /// Current state.
    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    pub(crate) fn body(&self) -> Arc<dyn TaskBody> {
        Arc::clone(&self.body)
    }

    pub(crate) fn watch_state(&self) -> watch::Receiver<TaskState> {
        self.state.subscribe()
    }

    pub(crate) fn set_state(&self, next: TaskState) {
        self.state.send_replace(next);
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.name, self.kind())
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("dependencies", &self.dependencies)
            .field("group", &self.group)
            .field("state", &self.state())
            .finish()
    }
}
