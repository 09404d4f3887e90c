//! Task execution: the bounded scheduler and the sequential combinators

pub mod fold;
pub mod scheduler;
pub mod waterfall;

pub use fold::{fold_async, Fold};
pub use scheduler::{parallel, serial, series, ProgressHandler, Scheduler, SchedulingStrategy, SerialRunner};
pub use waterfall::Waterfall;
