// src/exec/func.rs

use std::future::Future;

use crate::task::{BoxFuture, TaskBody, TaskError};

/// User-defined task body backed by a closure.
///
/// The closure is called once per execution and must return a `Send`
/// future; capture whatever state the work needs.
pub struct FnTask<F> {
    f: F,
}

impl<F> FnTask<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> TaskBody for FnTask<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn execute(&self) -> BoxFuture<'_, Result<(), TaskError>> {
        Box::pin((self.f)())
    }

    fn kind(&self) -> &'static str {
        "fn"
    }
}
