//! taskflow - bounded-concurrency task scheduling, waterfalls and async folds

pub mod cli;
pub mod core;
pub mod execution;
pub mod files;

// Re-export commonly used types
pub use crate::core::{
    AggregateFailure, Continuation, FoldError, Settlement, Task, TaskFailure, WaterfallError,
};
pub use crate::execution::{
    fold_async, parallel, serial, series, Fold, Scheduler, SchedulingStrategy, SerialRunner,
    Waterfall,
};
