// src/exec/sleep.rs

use std::time::Duration;

use tracing::debug;

use crate::task::{BoxFuture, TaskBody, TaskError};

/// Waits for a fixed duration and succeeds.
#[derive(Debug, Clone, Copy)]
pub struct SleepTask {
    duration: Duration,
}

impl SleepTask {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl TaskBody for SleepTask {
    fn execute(&self) -> BoxFuture<'_, Result<(), TaskError>> {
        Box::pin(async move {
            debug!(duration = ?self.duration, "sleeping");
            tokio::time::sleep(self.duration).await;
            Ok(())
        })
    }

    fn kind(&self) -> &'static str {
        "sleep"
    }
}
