// src/dag/scheduler.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::dag::context::FlowContext;
use crate::dag::graph::DependencyGraph;
use crate::dag::report::{FlowReport, TaskRecord};
use crate::dag::runner::{Predecessor, run_when_ready};
use crate::errors::{FlowError, Result};
use crate::task::Task;
use crate::types::TaskId;

/// Drives one execution of a dependency graph.
///
/// Tasks are issued in topological order. Each issued task is spawned as its
/// own tokio task that waits on its predecessors' completion signals, so a task
/// that is not ready yet never holds up the ones after it in the order.
/// Completion order is bounded only by readiness and group capacity.
pub(crate) struct Scheduler<'a> {
    graph: &'a DependencyGraph,
    tasks: &'a HashMap<TaskId, Arc<Task>>,
    ctx: FlowContext,
}

impl<'a> Scheduler<'a> {
    pub(crate) fn new(
        graph: &'a DependencyGraph,
        tasks: &'a HashMap<TaskId, Arc<Task>>,
        ctx: FlowContext,
    ) -> Self {
        Self { graph, tasks, ctx }
    }

    /// Run every task to a terminal state.
    ///
    /// Fails up front with [`FlowError::CyclicDependency`] (nothing is
    /// launched in that case) or [`FlowError::NotFound`] if the graph names a
    /// task that is not in the task map. Task failures do not fail the run;
    /// they are reported in the returned [`FlowReport`].
    pub(crate) async fn run(self) -> Result<FlowReport> {
        let start = Instant::now();
        let order = self
            .graph
            .topological_order()
            .collect::<Result<Vec<TaskId>>>()?;

        // Resolve everything before launching anything, so a lookup failure
        // leaves every task untouched.
        let mut plan = Vec::with_capacity(order.len());
        for &id in &order {
            let task = self.task(id)?;
            let predecessors = self
                .graph
                .predecessors_of(id)
                .into_iter()
                .map(|pred| {
                    self.task(pred).map(|t| Predecessor {
                        id: pred,
                        state: t.watch_state(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            plan.push((task, predecessors));
        }

        info!(task_count = order.len(), "scheduler: starting flow run");

        let mut handles = Vec::with_capacity(plan.len());
        for (task, predecessors) in plan {
            debug!(
                task = %task,
                id = %task.id(),
                predecessors = predecessors.len(),
                "scheduler: issuing task"
            );

            let unit = run_when_ready(Arc::clone(task), predecessors, self.ctx.clone());
            handles.push((task, tokio::spawn(unit)));
        }

        // Handles are awaited in issue order, so records come out in that
        // order too. A wrapper that aborted still leaves a record, built
        // from the task's last known state.
        let mut records = Vec::with_capacity(handles.len());
        for (task, handle) in handles {
            match handle.await {
                Ok(record) => records.push(record),
                Err(err) => {
                    error!(task = %task, error = %err, "scheduler: task wrapper aborted");
                    records.push(TaskRecord::new(task));
                }
            }
        }

        let report = FlowReport {
            duration: start.elapsed(),
            records,
        };

        info!(
            completed = report.completed_count(),
            failed = report.failures().len(),
            skipped = report.skipped().len(),
            elapsed = ?report.duration,
            "scheduler: flow run finished"
        );

        Ok(report)
    }

    fn task(&self, id: TaskId) -> Result<&'a Arc<Task>> {
        self.tasks.get(&id).ok_or(FlowError::NotFound(id))
    }
}
