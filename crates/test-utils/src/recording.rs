//! Task bodies that record what happened, for asserting on ordering and
//! concurrency from tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use flowdag::task::{BoxFuture, TaskBody, TaskError};
use flowdag::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Start,
    End,
}

/// Shared, append-only log of body starts and ends.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Arc<Mutex<Vec<(String, Mark)>>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str, mark: Mark) {
        self.entries.lock().unwrap().push((name.to_string(), mark));
    }

    pub fn entries(&self) -> Vec<(String, Mark)> {
        self.entries.lock().unwrap().clone()
    }

    /// Names in the order their bodies started.
    pub fn started(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(_, mark)| *mark == Mark::Start)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn position(&self, name: &str, mark: Mark) -> Option<usize> {
        self.entries()
            .iter()
            .position(|(n, m)| n == name && *m == mark)
    }

    /// Whether `name` started at all.
    pub fn ran(&self, name: &str) -> bool {
        self.position(name, Mark::Start).is_some()
    }

    /// Highest number of bodies among `names` running at the same time.
    pub fn max_concurrency(&self, names: &[&str]) -> usize {
        let mut current = 0usize;
        let mut max = 0usize;
        for (name, mark) in self.entries() {
            if !names.contains(&name.as_str()) {
                continue;
            }
            match mark {
                Mark::Start => {
                    current += 1;
                    max = max.max(current);
                }
                Mark::End => current = current.saturating_sub(1),
            }
        }
        max
    }
}

/// Records start and end on a [`Timeline`], sleeping in between.
pub struct RecordingTask {
    label: String,
    timeline: Timeline,
    delay: Duration,
}

impl RecordingTask {
    pub fn new(label: &str, timeline: &Timeline, delay: Duration) -> Self {
        Self {
            label: label.to_string(),
            timeline: timeline.clone(),
            delay,
        }
    }
}

impl TaskBody for RecordingTask {
    fn execute(&self) -> BoxFuture<'_, Result<(), TaskError>> {
        Box::pin(async move {
            self.timeline.record(&self.label, Mark::Start);
            tokio::time::sleep(self.delay).await;
            self.timeline.record(&self.label, Mark::End);
            Ok(())
        })
    }

    fn kind(&self) -> &'static str {
        "recording"
    }
}

/// Always returns an error.
pub struct FailingTask {
    message: String,
}

impl FailingTask {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl TaskBody for FailingTask {
    fn execute(&self) -> BoxFuture<'_, Result<(), TaskError>> {
        Box::pin(async move { Err(TaskError::failed(self.message.clone())) })
    }

    fn kind(&self) -> &'static str {
        "failing"
    }
}

/// Panics when executed.
pub struct PanickingTask {
    message: String,
}

impl PanickingTask {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

async fn explode(message: &str) -> Result<(), TaskError> {
    panic!("{}", message);
}

impl TaskBody for PanickingTask {
    fn execute(&self) -> BoxFuture<'_, Result<(), TaskError>> {
        Box::pin(explode(&self.message))
    }

    fn kind(&self) -> &'static str {
        "panicking"
    }
}

/// A task named `name` whose body records on `timeline` for `delay`.
pub fn recording(name: &str, timeline: &Timeline, delay: Duration) -> Task {
    Task::new(name, RecordingTask::new(name, timeline, delay))
}

pub fn failing(name: &str, message: &str) -> Task {
    Task::new(name, FailingTask::new(message))
}

pub fn panicking(name: &str, message: &str) -> Task {
    Task::new(name, PanickingTask::new(message))
}
