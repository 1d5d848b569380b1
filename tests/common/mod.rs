#![allow(dead_code)]

use std::time::Duration;

pub use flowdag_test_utils::{init_tracing, with_timeout};

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}
