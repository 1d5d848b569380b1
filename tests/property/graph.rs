use std::collections::{HashMap, HashSet};
use std::time::Duration;

use proptest::prelude::*;
use flowdag::{Flow, Task, TaskId};

// Strategy to generate a random DAG as dependency lists.
// Acyclicity is guaranteed by only letting task N depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..4),
            num_tasks,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, deps)| {
                    if i == 0 {
                        return Vec::new();
                    }
                    let unique: HashSet<usize> = deps.into_iter().map(|d| d % i).collect();
                    unique.into_iter().collect()
                })
                .collect()
        })
    })
}

/// Build tasks for `deps` and register them in a rotated order, so that a
/// task can be registered before its predecessors within the batch.
fn build_flow(deps: &[Vec<usize>], rotate: usize) -> (Flow, Vec<TaskId>) {
    let mut tasks: Vec<Task> = Vec::with_capacity(deps.len());
    for (i, preds) in deps.iter().enumerate() {
        let mut task = Task::sleep(format!("task_{i}"), Duration::ZERO);
        for &p in preds {
            task = task.after_id(tasks[p].id());
        }
        tasks.push(task);
    }
    let ids: Vec<TaskId> = tasks.iter().map(|t| t.id()).collect();

    let len = tasks.len();
    tasks.rotate_left(rotate % len);

    let mut flow = Flow::new();
    flow.register_tasks(tasks).unwrap();
    (flow, ids)
}

proptest! {
    #[test]
    fn iter_graph_respects_every_edge(deps in dag_strategy(16), rotate in 0..16usize) {
        let (flow, ids) = build_flow(&deps, rotate);

        let order: Vec<TaskId> = flow
            .iter_graph()
            .map(|t| t.map(|t| t.id()))
            .collect::<Result<_, _>>()
            .unwrap();

        prop_assert_eq!(order.len(), ids.len());
        let position: HashMap<TaskId, usize> =
            order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        prop_assert_eq!(position.len(), ids.len());

        for (i, preds) in deps.iter().enumerate() {
            for &p in preds {
                prop_assert!(position[&ids[p]] < position[&ids[i]]);
            }
        }
    }

    #[test]
    fn iter_graph_is_repeatable(deps in dag_strategy(16), rotate in 0..16usize) {
        let (flow, _ids) = build_flow(&deps, rotate);

        let first: Vec<TaskId> = flow.iter_graph().map(|t| t.unwrap().id()).collect();
        let second: Vec<TaskId> = flow.iter_graph().map(|t| t.unwrap().id()).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn iter_predecessors_matches_declared_dependencies(deps in dag_strategy(12)) {
        let (flow, ids) = build_flow(&deps, 0);

        for (i, preds) in deps.iter().enumerate() {
            let got: HashSet<TaskId> = flow
                .iter_predecessors(ids[i])
                .unwrap()
                .into_iter()
                .map(|t| t.id())
                .collect();
            let want: HashSet<TaskId> = preds.iter().map(|&p| ids[p]).collect();
            prop_assert_eq!(got, want);
        }
    }
}
