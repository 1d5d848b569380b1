// tests/registration.rs

mod common;
use crate::common::{init_tracing, ms};

use std::collections::HashSet;
use std::sync::Arc;

use flowdag::errors::FlowError;
use flowdag::{Flow, Task, TaskId, TaskState};

fn ids(tasks: &[&Arc<Task>]) -> Vec<TaskId> {
    tasks.iter().map(|t| t.id()).collect()
}

#[test]
fn tasks_with_the_same_name_stay_distinct() {
    init_tracing();
    let a1 = Task::sleep("build", ms(1));
    let a2 = Task::sleep("build", ms(1));
    assert_ne!(a1.id(), a2.id());

    let mut flow = Flow::new();
    flow.register_tasks([a1, a2]).unwrap();
    assert_eq!(flow.len(), 2);
    assert!(flow.tasks().all(|t| t.name() == "build"));
}

#[test]
fn new_tasks_start_pending_with_no_dependencies() {
    let task = Task::shell("lint", "true");
    assert_eq!(task.state(), TaskState::Pending);
    assert!(task.dependencies().is_empty());
    assert_eq!(task.group(), None);
    assert_eq!(task.kind(), "shell");
    assert_eq!(task.to_string(), "lint<shell>");
}

#[test]
fn after_ignores_repeated_predecessors() {
    let a = Task::sleep("a", ms(1));
    let b = Task::sleep("b", ms(1)).after(&a).after(&a).after_id(a.id());
    assert_eq!(b.dependencies(), &[a.id()]);
}

#[test]
fn unknown_id_is_not_found() {
    let flow = Flow::new();
    let stray = Task::sleep("stray", ms(1));

    match flow.get_task_by_id(stray.id()) {
        Err(FlowError::NotFound(id)) => assert_eq!(id, stray.id()),
        other => panic!("Expected NotFound, got: {:?}", other),
    }
    assert!(matches!(
        flow.iter_predecessors(stray.id()),
        Err(FlowError::NotFound(_))
    ));
}

#[test]
fn duplicate_group_is_rejected() {
    let mut flow = Flow::new();
    flow.create_group("db", 2).unwrap();

    match flow.create_group("db", 4) {
        Err(FlowError::DuplicateGroup(name)) => assert_eq!(name, "db"),
        other => panic!("Expected DuplicateGroup, got: {:?}", other),
    }
    // The original group is untouched.
    assert_eq!(flow.group("db").map(|g| g.capacity()), Some(2));
}

#[test]
fn zero_capacity_group_is_rejected() {
    let mut flow = Flow::new();
    assert!(matches!(
        flow.create_group("none", 0),
        Err(FlowError::InvalidCapacity { capacity: 0, .. })
    ));
    assert!(flow.group("none").is_none());
}

#[test]
fn registering_the_same_task_twice_is_a_noop() {
    let mut flow = Flow::new();
    let a = Arc::new(Task::sleep("a", ms(1)));

    flow.register_task(Arc::clone(&a)).unwrap();
    flow.register_task(Arc::clone(&a)).unwrap();
    flow.register_tasks([Arc::clone(&a), Arc::clone(&a)]).unwrap();

    assert_eq!(flow.len(), 1);
    assert_eq!(flow.graph().len(), 1);
}

#[test]
fn unregistered_predecessor_is_rejected_and_flow_is_unchanged() {
    let mut flow = Flow::new();
    let a = Task::sleep("a", ms(1));
    let b = Task::sleep("b", ms(1)).after(&a);
    let c = Task::sleep("c", ms(1));
    let a_id = a.id();

    match flow.register_tasks([c, b]) {
        Err(FlowError::UnregisteredDependency { task, dependency }) => {
            assert_eq!(task, "b");
            assert_eq!(dependency, a_id);
        }
        other => panic!("Expected UnregisteredDependency, got: {:?}", other),
    }
    assert!(flow.is_empty());
    assert!(flow.graph().is_empty());
}

#[test]
fn predecessor_may_appear_later_in_the_same_batch() {
    let mut flow = Flow::new();
    let a = Task::sleep("a", ms(1));
    let b = Task::sleep("b", ms(1)).after(&a);
    let (a_id, b_id) = (a.id(), b.id());

    flow.register_tasks([b, a]).unwrap();

    let order: Vec<TaskId> = flow.iter_graph().map(|t| t.unwrap().id()).collect();
    assert_eq!(order, vec![a_id, b_id]);
}

#[test]
fn iter_predecessors_returns_direct_predecessors_only() {
    let mut flow = Flow::new();
    let a = Task::sleep("a", ms(1));
    let b = Task::sleep("b", ms(1));
    let c = Task::sleep("c", ms(1)).after(&a);
    let d = Task::sleep("d", ms(1)).after_all([&b, &c]);
    let (a_id, b_id, c_id, d_id) = (a.id(), b.id(), c.id(), d.id());

    flow.register_tasks([a, b, c, d]).unwrap();

    let preds: HashSet<TaskId> = ids(&flow.iter_predecessors(d_id).unwrap())
        .into_iter()
        .collect();
    assert_eq!(preds, HashSet::from([b_id, c_id]));
    assert!(flow.iter_predecessors(a_id).unwrap().is_empty());
    assert_eq!(flow.graph().dependents_of(a_id), vec![c_id]);
}

#[test]
fn iter_graph_is_deterministic_and_restartable() {
    let mut flow = Flow::new();
    let c = Task::sleep("c", ms(1));
    let a = Task::sleep("a", ms(1));
    let b = Task::sleep("b", ms(1)).after(&a);
    let e = Task::sleep("e", ms(1)).after(&c);
    let (a_id, b_id, c_id, e_id) = (a.id(), b.id(), c.id(), e.id());

    flow.register_tasks([c, a, b, e]).unwrap();

    let first: Vec<TaskId> = flow.iter_graph().map(|t| t.unwrap().id()).collect();
    let second: Vec<TaskId> = flow.iter_graph().map(|t| t.unwrap().id()).collect();

    // Ready ties are broken by registration order.
    assert_eq!(first, vec![c_id, a_id, b_id, e_id]);
    assert_eq!(first, second);
}

#[test]
fn cycle_is_reported_by_validate_and_iter_graph() {
    let mut flow = Flow::new();
    let a = Task::sleep("a", ms(1));
    let b = Task::sleep("b", ms(1)).after(&a);
    let a = a.after(&b);
    let (a_id, b_id) = (a.id(), b.id());

    flow.register_tasks([a, b]).unwrap();

    match flow.validate() {
        Err(FlowError::CyclicDependency(id)) => assert!(id == a_id || id == b_id),
        other => panic!("Expected CyclicDependency, got: {:?}", other),
    }

    let items: Vec<_> = flow.iter_graph().collect();
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(FlowError::CyclicDependency(_))));
}

#[test]
fn take_state_events_hands_out_a_single_receiver() {
    let mut flow = Flow::new();
    assert!(flow.take_state_events().is_some());
    assert!(flow.take_state_events().is_none());
}
