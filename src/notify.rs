// src/notify.rs

//! One-way channel of task state transitions for an outside observer.
//!
//! Writes go into an unbounded queue and never wait on the reader, so a slow
//! or absent observer cannot stall task completion.

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::trace;

use crate::types::{TaskId, TaskState};

/// A single state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEvent {
    pub task_id: TaskId,
    pub state: TaskState,
    pub at: Instant,
}

/// Producer side, cloned into every task wrapper.
#[derive(Debug, Clone)]
pub struct StateNotifier {
    tx: mpsc::UnboundedSender<StateEvent>,
}

/// Consumer side, handed out once by [`crate::Flow::take_state_events`].
#[derive(Debug)]
pub struct StateEvents {
    rx: mpsc::UnboundedReceiver<StateEvent>,
}

/// Create a connected notifier / receiver pair.
pub fn channel() -> (StateNotifier, StateEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (StateNotifier { tx }, StateEvents { rx })
}

impl StateNotifier {
    pub fn publish(&self, task_id: TaskId, state: TaskState) {
        let event = StateEvent {
            task_id,
            state,
            at: Instant::now(),
        };
        if self.tx.send(event).is_err() {
            trace!(task = %task_id, %state, "no state observer attached; dropping event");
        }
    }
}

impl StateEvents {
    /// Next event, or `None` once every notifier has been dropped.
    pub async fn recv(&mut self) -> Option<StateEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<StateEvent> {
        self.rx.try_recv().ok()
    }

    /// Everything queued so far, without waiting.
    pub fn drain(&mut self) -> Vec<StateEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }
}
