// src/flow.rs

//! The `Flow` aggregate: registered tasks, their dependency graph, the
//! concurrency-group registry and the state notifier.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use crate::dag::{DependencyGraph, FlowContext, FlowReport, Scheduler};
use crate::errors::{FlowError, Result};
use crate::group::ConcurrencyGroup;
use crate::notify::{self, StateEvents, StateNotifier};
use crate::task::Task;
use crate::types::TaskId;

/// A set of tasks and groups that can be run once.
///
/// Registration (`register_*`, `create_group`) needs `&mut self`, and so does
/// [`Flow::run`], so the borrow checker rules out registering while a run is
/// in progress.
#[derive(Debug)]
pub struct Flow {
    tasks: HashMap<TaskId, Arc<Task>>,
    graph: DependencyGraph,
    groups: BTreeMap<String, Arc<ConcurrencyGroup>>,
    notifier: StateNotifier,
    events: Option<StateEvents>,
    has_run: bool,
}

impl Default for Flow {
    fn default() -> Self {
        Self::new()
    }
}

impl Flow {
    pub fn new() -> Self {
        let (notifier, events) = notify::channel();
        Self {
            tasks: HashMap::new(),
            graph: DependencyGraph::new(),
            groups: BTreeMap::new(),
            notifier,
            events: Some(events),
            has_run: false,
        }
    }

    /// Register a single task.
    ///
    /// Every predecessor the task declares must already be registered.
    /// Registering the same task instance again is a no-op.
    pub fn register_task(&mut self, task: impl Into<Arc<Task>>) -> Result<()> {
        self.register_tasks([task])
    }

    /// Register several tasks at once.
    ///
    /// Predecessors may be registered earlier or appear anywhere in the same
    /// batch. The batch is validated as a whole before anything is added, so
    /// on error the flow is left unchanged.
    pub fn register_tasks<I, T>(&mut self, tasks: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<Arc<Task>>,
    {
        let mut batch: Vec<Arc<Task>> = Vec::new();
        let mut batch_ids: HashSet<TaskId> = HashSet::new();

        for task in tasks {
            let task = task.into();
            if self.tasks.contains_key(&task.id()) || !batch_ids.insert(task.id()) {
                debug!(task = %task, id = %task.id(), "task already registered; ignoring");
                continue;
            }
            batch.push(task);
        }

        for task in &batch {
            for dep in task.dependencies() {
                if !self.tasks.contains_key(dep) && !batch_ids.contains(dep) {
                    return Err(FlowError::UnregisteredDependency {
                        task: task.name().to_string(),
                        dependency: *dep,
                    });
                }
            }
        }

        // Nodes first, so that graph order follows registration order even
        // when a task precedes its own predecessor in the batch.
        for task in &batch {
            self.graph.add_node(task.id());
        }
        for task in batch {
            self.graph.add_task(&task);
            debug!(task = %task, id = %task.id(), "registered task");
            self.tasks.insert(task.id(), task);
        }

        Ok(())
    }

    /// Create a concurrency group admitting at most `capacity` running tasks.
    pub fn create_group(&mut self, name: impl Into<String>, capacity: usize) -> Result<()> {
        let name = name.into();
        if self.groups.contains_key(&name) {
            return Err(FlowError::DuplicateGroup(name));
        }
        let group = ConcurrencyGroup::new(name.clone(), capacity)?;
        debug!(group = %name, capacity, "created concurrency group");
        self.groups.insert(name, Arc::new(group));
        Ok(())
    }

    pub fn group(&self, name: &str) -> Option<&ConcurrencyGroup> {
        self.groups.get(name).map(|g| g.as_ref())
    }

    pub fn get_task_by_id(&self, id: TaskId) -> Result<&Arc<Task>> {
        self.tasks.get(&id).ok_or(FlowError::NotFound(id))
    }

    /// Registered tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &Arc<Task>> + '_ {
        self.graph.task_ids().filter_map(|id| self.tasks.get(&id))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Tasks in dependency order.
    ///
    /// Lazy and recomputed on every call. Ties are broken by registration
    /// order. A cycle shows up as a final `Err(CyclicDependency)` item.
    pub fn iter_graph(&self) -> impl Iterator<Item = Result<&Arc<Task>>> + '_ {
        self.graph
            .topological_order()
            .map(|id| id.and_then(|id| self.get_task_by_id(id)))
    }

    /// Direct predecessors of a registered task.
    pub fn iter_predecessors(&self, id: TaskId) -> Result<Vec<&Arc<Task>>> {
        self.get_task_by_id(id)?;
        self.graph
            .predecessors_of(id)
            .into_iter()
            .map(|pred| self.get_task_by_id(pred))
            .collect()
    }

    /// Take the receiving end of the state-transition channel.
    ///
    /// There is a single consumer; later calls return `None`.
    pub fn take_state_events(&mut self) -> Option<StateEvents> {
        self.events.take()
    }

    /// Check that the flow can be run: every group a task names exists and
    /// the graph is acyclic.
    pub fn validate(&self) -> Result<()> {
        for task in self.tasks() {
            if let Some(group) = task.group() {
                if !self.groups.contains_key(group) {
                    return Err(FlowError::UnknownGroup {
                        task: task.name().to_string(),
                        group: group.to_string(),
                    });
                }
            }
        }
        self.graph.check_acyclic()
    }

    /// Run every registered task to a terminal state.
    ///
    /// Configuration problems are returned as `Err` before any task starts.
    /// Task failures are not: they are collected in the returned
    /// [`FlowReport`] once every unaffected branch has finished.
    pub async fn run(&mut self) -> Result<FlowReport> {
        if self.has_run {
            return Err(FlowError::AlreadyRun);
        }
        self.validate()?;
        self.has_run = true;

        info!(
            tasks = self.tasks.len(),
            groups = self.groups.len(),
            "running flow"
        );

        let ctx = FlowContext::new(self.groups.clone(), self.notifier.clone());
        Scheduler::new(&self.graph, &self.tasks, ctx).run().await
    }

    /// Blocking wrapper around [`Flow::run`] that builds its own runtime.
    ///
    /// Must not be called from inside an async context.
    pub fn run_blocking(&mut self) -> Result<FlowReport> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.run())
    }
}
