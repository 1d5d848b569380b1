// tests/task_kinds.rs

mod common;
use crate::common::{init_tracing, ms, with_timeout};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use flowdag::{Flow, Task, TaskState};

#[cfg(unix)]
#[tokio::test]
async fn shell_task_succeeds_and_fails_on_exit_code() {
    init_tracing();
    let ok = Task::shell("ok", "echo hello && true");
    let bad = Task::shell("bad", "echo oops 1>&2; exit 3");
    let (ok_id, bad_id) = (ok.id(), bad.id());

    let mut flow = Flow::new();
    flow.register_tasks([ok, bad]).unwrap();

    let report = with_timeout(flow.run()).await.unwrap();

    assert_eq!(report.state_of(ok_id), Some(TaskState::Done));
    let bad = report.record(bad_id).unwrap();
    assert_eq!(bad.state, TaskState::Failed);
    assert!(bad.error.as_deref().unwrap().contains("code 3"));
}

#[cfg(unix)]
#[tokio::test]
async fn shell_tasks_see_effects_of_predecessors() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker");
    let marker = marker.display();

    let write = Task::shell("write", format!("echo done > {marker}"));
    let check = Task::shell("check", format!("test -f {marker}")).after(&write);
    let check_id = check.id();

    let mut flow = Flow::new();
    flow.register_tasks([write, check]).unwrap();

    let report = with_timeout(flow.run()).await.unwrap();
    assert_eq!(report.state_of(check_id), Some(TaskState::Done));
}

#[tokio::test]
async fn sleep_task_takes_at_least_its_duration() {
    init_tracing();
    let nap = Task::sleep("nap", ms(40));
    let id = nap.id();
    assert_eq!(nap.kind(), "sleep");

    let mut flow = Flow::new();
    flow.register_task(nap).unwrap();

    let report = with_timeout(flow.run()).await.unwrap();
    assert!(report.record(id).unwrap().elapsed().unwrap() >= ms(40));
}

#[tokio::test]
async fn fn_task_runs_exactly_once() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let task = Task::from_fn("count", move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });
    assert_eq!(task.kind(), "fn");

    let mut flow = Flow::new();
    flow.register_task(task).unwrap();
    let report = with_timeout(flow.run()).await.unwrap();

    assert!(report.is_success());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn run_blocking_drives_the_flow_without_an_outer_runtime() {
    init_tracing();
    let a = Task::sleep("a", ms(5));
    let b = Task::sleep("b", ms(5)).after(&a);

    let mut flow = Flow::new();
    flow.register_tasks([a, b]).unwrap();

    let report = flow.run_blocking().unwrap();
    assert!(report.is_success());
    assert_eq!(report.completed_count(), 2);
}
