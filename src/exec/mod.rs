// src/exec/mod.rs

//! Concrete task bodies.
//!
//! Each kind implements [`crate::task::TaskBody`] and knows nothing about
//! scheduling, state or concurrency groups.
//!
//! - [`shell`] runs a command through the platform shell with
//!   `tokio::process::Command`.
//! - [`sleep`] waits for a fixed duration.
//! - [`func`] wraps a user closure.

pub mod func;
pub mod shell;
pub mod sleep;

pub use func::FnTask;
pub use shell::ShellTask;
pub use sleep::SleepTask;
