// src/dag/graph.rs

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{FlowError, Result};
use crate::task::Task;
use crate::types::TaskId;

/// Dependency graph keyed by task id.
///
/// Edge direction is predecessor -> dependent: for a task B declared
/// `after(A)` we add edge `A -> B`. Nodes keep their insertion order, which
/// is what makes [`DependencyGraph::topological_order`] deterministic.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraphMap<TaskId, ()>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node for `task` and an edge from each of its predecessors.
    pub fn add_task(&mut self, task: &Task) {
        self.add_node(task.id());
        for &dep in task.dependencies() {
            self.add_dependency(dep, task.id());
        }
    }

    pub fn add_node(&mut self, id: TaskId) {
        self.graph.add_node(id);
    }

    /// Record that `dependent` must wait for `dependency`.
    pub fn add_dependency(&mut self, dependency: TaskId, dependent: TaskId) {
        self.graph.add_edge(dependency, dependent, ());
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.graph.contains_node(id)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All node ids in insertion order.
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.graph.nodes()
    }

    /// Direct predecessors of `id` (tasks it waits for).
    pub fn predecessors_of(&self, id: TaskId) -> Vec<TaskId> {
        if !self.contains(id) {
            return Vec::new();
        }
        self.graph
            .neighbors_directed(id, Direction::Incoming)
            .collect()
    }

    /// Direct dependents of `id` (tasks waiting for it).
    pub fn dependents_of(&self, id: TaskId) -> Vec<TaskId> {
        if !self.contains(id) {
            return Vec::new();
        }
        self.graph
            .neighbors_directed(id, Direction::Outgoing)
            .collect()
    }

    /// Lazy topological walk; see [`TopologicalOrder`].
    pub fn topological_order(&self) -> TopologicalOrder<'_> {
        TopologicalOrder::new(self)
    }

    /// Fail with [`FlowError::CyclicDependency`] if the graph has a cycle.
    pub fn check_acyclic(&self) -> Result<()> {
        match toposort(&self.graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(FlowError::CyclicDependency(cycle.node_id())),
        }
    }

    fn cycle_member(&self) -> Option<TaskId> {
        toposort(&self.graph, None).err().map(|c| c.node_id())
    }
}

/// Iterator over task ids in dependency order.
///
/// Kahn's algorithm: a node is yielded once all its predecessors have been
/// yielded. Among nodes that are ready at the same time, the one inserted
/// first comes first. If the graph contains a cycle, the iterator yields a
/// single `Err(CyclicDependency)` once no more nodes can be released, then
/// ends.
pub struct TopologicalOrder<'a> {
    graph: &'a DependencyGraph,
    position: HashMap<TaskId, usize>,
    in_degree: HashMap<TaskId, usize>,
    ready: BinaryHeap<Reverse<(usize, TaskId)>>,
    emitted: usize,
    finished: bool,
}

impl<'a> TopologicalOrder<'a> {
    fn new(graph: &'a DependencyGraph) -> Self {
        let mut position = HashMap::with_capacity(graph.len());
        let mut in_degree = HashMap::with_capacity(graph.len());
        let mut ready = BinaryHeap::new();

        for (pos, id) in graph.task_ids().enumerate() {
            position.insert(id, pos);
            let degree = graph
                .graph
                .neighbors_directed(id, Direction::Incoming)
                .count();
            if degree == 0 {
                ready.push(Reverse((pos, id)));
            }
            in_degree.insert(id, degree);
        }

        Self {
            graph,
            position,
            in_degree,
            ready,
            emitted: 0,
            finished: false,
        }
    }
}

impl Iterator for TopologicalOrder<'_> {
    type Item = Result<TaskId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let Some(Reverse((_, id))) = self.ready.pop() else {
            self.finished = true;
            if self.emitted == self.graph.len() {
                return None;
            }
            // Nodes remain but none is free: they sit on or behind a cycle.
            let culprit = self.graph.cycle_member().or_else(|| {
                self.in_degree
                    .iter()
                    .filter(|(_, degree)| **degree > 0)
                    .min_by_key(|(id, _)| self.position[*id])
                    .map(|(id, _)| *id)
            });
            return culprit.map(|id| Err(FlowError::CyclicDependency(id)));
        };

        for next in self.graph.graph.neighbors_directed(id, Direction::Outgoing) {
            if let Some(degree) = self.in_degree.get_mut(&next) {
                *degree -= 1;
                if *degree == 0 {
                    self.ready.push(Reverse((self.position[&next], next)));
                }
            }
        }

        self.emitted += 1;
        Some(Ok(id))
    }
}
