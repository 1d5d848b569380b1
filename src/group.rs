// src/group.rs

//! Named, capacity-bounded admission gates.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, trace};

use crate::errors::{FlowError, Result};

/// Counting gate shared by every task assigned to the same group name.
///
/// Backed by a tokio [`Semaphore`]; waiters are admitted in FIFO order, so a
/// suspended `acquire` always resolves once capacity frees up.
#[derive(Debug)]
pub struct ConcurrencyGroup {
    name: String,
    capacity: usize,
    semaphore: Arc<Semaphore>,
}

impl ConcurrencyGroup {
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self> {
        let name = name.into();
        if capacity == 0 {
            return Err(FlowError::InvalidCapacity { name, capacity });
        }
        Ok(Self {
            name,
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits currently held.
    pub fn active(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }

    /// Stop admitting tasks. Pending and future `acquire` calls fail with
    /// [`FlowError::GroupClosed`]; slots already held stay valid.
    pub fn close(&self) {
        debug!(group = %self.name, "closing concurrency group");
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    /// Wait for a free slot and take it.
    ///
    /// The slot is given back when the returned permit is released or
    /// dropped.
    pub async fn acquire(&self) -> Result<GroupPermit> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| FlowError::GroupClosed(self.name.clone()))?;
        trace!(group = %self.name, active = self.active(), "group slot acquired");
        Ok(GroupPermit {
            group: self.name.clone(),
            _permit: permit,
        })
    }
}

/// A held slot in a [`ConcurrencyGroup`].
#[derive(Debug)]
pub struct GroupPermit {
    group: String,
    _permit: OwnedSemaphorePermit,
}

impl GroupPermit {
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Give the slot back, admitting one waiter if any.
    pub fn release(self) {
        trace!(group = %self.group, "group slot released");
    }
}
