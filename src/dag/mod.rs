// src/dag/mod.rs

//! Dependency graph and scheduling.
//!
//! - [`graph`] holds the task dependency graph and its topological walk.
//! - [`scheduler`] issues tasks in dependency order and waits for all of
//!   them.
//! - [`runner`] is the per-task wrapper: readiness wait, group admission,
//!   state transitions.
//! - [`context`] is the explicit execution context threaded through a run.
//! - [`report`] defines the aggregated run result.

pub(crate) mod context;
pub mod graph;
pub mod report;
pub(crate) mod runner;
pub(crate) mod scheduler;

pub(crate) use context::FlowContext;
pub use graph::{DependencyGraph, TopologicalOrder};
pub use report::{FlowReport, TaskRecord};
pub(crate) use scheduler::Scheduler;
