// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod flow;
pub mod group;
pub mod logging;
pub mod notify;
pub mod task;
pub mod types;

pub use dag::{DependencyGraph, FlowReport, TaskRecord};
pub use errors::{FailedTask, FlowError};
pub use flow::Flow;
pub use group::{ConcurrencyGroup, GroupPermit};
pub use notify::{StateEvent, StateEvents};
pub use task::{Task, TaskBody, TaskError};
pub use types::{TaskId, TaskState};

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - flow file loading + validation
/// - flow assembly
/// - a state observer printing transitions to stdout
/// - the run itself and the final summary
pub async fn run(args: CliArgs) -> Result<()> {
    let flow_path = args.flow_path();
    let file = load_and_validate(&flow_path)?;
    let mut flow = file.build_flow()?;

    if args.dry_run {
        print_dry_run(&flow)?;
        return Ok(());
    }

    let names: HashMap<TaskId, String> = flow
        .tasks()
        .map(|t| (t.id(), t.name().to_string()))
        .collect();

    let observer = flow.take_state_events().map(|mut events| {
        let quiet = args.quiet;
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if quiet {
                    continue;
                }
                let name = names.get(&event.task_id).map(String::as_str).unwrap_or("?");
                println!("[{}] {} -> {}", event.task_id, name, event.state);
            }
        })
    });

    info!(path = %flow_path.display(), tasks = flow.len(), "starting flow");
    let report = flow.run().await?;

    // The observer loop ends once the last notifier (owned by the flow) is gone.
    drop(flow);
    if let Some(handle) = observer {
        handle.await?;
    }

    print_summary(&report);
    report.ensure_success()?;
    Ok(())
}

/// Print every task in the order it would be issued, with its predecessors.
fn print_dry_run(flow: &Flow) -> Result<()> {
    println!("flowdag dry-run");
    println!();

    println!("tasks ({}), in execution order:", flow.len());
    for task in flow.iter_graph() {
        let task = task?;
        println!("  - {} [{}]", task.name(), task.kind());
        let preds = flow.iter_predecessors(task.id())?;
        if !preds.is_empty() {
            let names: Vec<&str> = preds.iter().map(|p| p.name()).collect();
            println!("      after: {:?}", names);
        }
        if let Some(group) = task.group() {
            println!("      group: {group}");
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}

fn print_summary(report: &FlowReport) {
    println!();
    println!(
        "{} of {} task(s) done in {:.2?}",
        report.completed_count(),
        report.records.len(),
        report.duration
    );
    for record in report.records.iter() {
        match record.state {
            TaskState::Failed => println!(
                "  failed:  {} ({})",
                record.name,
                record.error.as_deref().unwrap_or("unknown error")
            ),
            TaskState::Skipped => println!("  skipped: {}", record.name),
            _ => {}
        }
    }
}
