//! Bounded-concurrency scheduler
//!
//! Runs an ordered list of tasks with at most K of them in flight, admitting
//! the lowest-index unstarted task whenever a slot frees. Results come back
//! index-aligned regardless of completion order.
//!
//! A limit of `0` means *unbounded*, not "run nothing": it behaves exactly
//! like a limit equal to the number of tasks.

use crate::core::{AggregateFailure, SchedulerState, Settlement, Task, TaskFailure};
use chrono::Utc;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Strategy for scheduling task execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingStrategy {
    /// One task at a time, in input order
    Sequential,

    /// Every task at once
    Parallel,

    /// Limited parallelism (max N concurrent tasks, 0 = unbounded)
    LimitedParallel(usize),
}

impl Default for SchedulingStrategy {
    fn default() -> Self {
        SchedulingStrategy::Parallel
    }
}

impl SchedulingStrategy {
    /// Map a numeric limit to a strategy; `0` means unbounded
    pub fn from_limit(limit: usize) -> Self {
        match limit {
            0 => SchedulingStrategy::Parallel,
            1 => SchedulingStrategy::Sequential,
            n => SchedulingStrategy::LimitedParallel(n),
        }
    }

    /// Concurrency actually used for `total` tasks
    pub fn effective_limit(&self, total: usize) -> usize {
        match *self {
            SchedulingStrategy::Sequential => 1,
            SchedulingStrategy::Parallel | SchedulingStrategy::LimitedParallel(0) => total,
            SchedulingStrategy::LimitedParallel(n) => n.min(total),
        }
    }
}

/// Handler invoked once per task settlement
pub type ProgressHandler<T, E> = Arc<dyn Fn(&Settlement<T, E>) + Send + Sync>;

/// Runs tasks with bounded concurrency.
///
/// The scheduler itself holds only configuration; every call to
/// [`Scheduler::run`] builds and drops its own [`SchedulerState`].
pub struct Scheduler<T, E> {
    strategy: SchedulingStrategy,
    progress_handlers: Vec<ProgressHandler<T, E>>,
}

impl<T, E> Scheduler<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new(strategy: SchedulingStrategy) -> Self {
        Self {
            strategy,
            progress_handlers: Vec::new(),
        }
    }

    /// Scheduler for a numeric limit (`0` = unbounded)
    pub fn with_limit(limit: usize) -> Self {
        Self::new(SchedulingStrategy::from_limit(limit))
    }

    pub fn strategy(&self) -> SchedulingStrategy {
        self.strategy
    }

    /// Add a progress handler.
    ///
    /// Handlers fire in completion order, once per settled task, success or
    /// failure. They are informational only.
    pub fn on_progress<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Settlement<T, E>) + Send + Sync + 'static,
    {
        self.progress_handlers.push(Arc::new(handler));
        self
    }

    fn emit_progress(&self, settlement: &Settlement<T, E>) {
        for handler in &self.progress_handlers {
            handler(settlement);
        }
    }

    /// Run every task to completion.
    ///
    /// Returns the index-aligned results, or the first failure observed. A
    /// failure does not stop admission: all tasks run before this returns.
    pub async fn run(&self, tasks: Vec<Task<T, E>>) -> Result<Vec<T>, AggregateFailure<E>> {
        let run_id = Uuid::new_v4();
        let total = tasks.len();
        let limit = self.strategy.effective_limit(total);
        let mut state = SchedulerState::new(total, limit);
        let mut pending = tasks.into_iter();
        let mut in_flight = JoinSet::new();
        let mut indices = HashMap::new();

        info!("Scheduling {} task(s) with limit {} ({})", total, limit, run_id);

        loop {
            while let Some(index) = state.admit() {
                let Some(task) = pending.next() else {
                    break;
                };
                debug!("Starting task #{} ({} running) ({})", index, state.running(), run_id);
                let handle = in_flight.spawn(task);
                indices.insert(handle.id(), index);
            }

            if state.is_done() {
                break;
            }

            let (id, outcome) = match in_flight.join_next_with_id().await {
                Some(Ok((id, result))) => (id, result.map_err(TaskFailure::Failed)),
                Some(Err(join_error)) => {
                    let id = join_error.id();
                    let failure = if join_error.is_panic() {
                        TaskFailure::Panicked(panic_message(join_error.into_panic()))
                    } else {
                        TaskFailure::Abandoned
                    };
                    (id, Err(failure))
                }
                None => {
                    error!(
                        "No tasks in flight but only {}/{} settled ({})",
                        state.finished(),
                        total,
                        run_id
                    );
                    break;
                }
            };

            let Some(index) = indices.remove(&id) else {
                error!("Settled task {} was never admitted ({})", id, run_id);
                continue;
            };

            match &outcome {
                Ok(_) => debug!("Task #{} succeeded ({})", index, run_id),
                Err(failure) if state.has_failed() => warn!(
                    "Task #{} failed after an earlier failure, discarding: {} ({})",
                    index,
                    failure_kind(failure),
                    run_id
                ),
                Err(failure) => warn!("Task #{} failed: {} ({})", index, failure_kind(failure), run_id),
            }

            let settlement = Settlement {
                index,
                outcome,
                finished: state.finished() + 1,
                total,
                settled_at: Utc::now(),
            };
            self.emit_progress(&settlement);
            state.settle(settlement.index, settlement.outcome);
        }

        let has_failed = state.has_failed();
        let result = state.into_outcome();
        if has_failed {
            info!("Scheduled run finished with failures ({})", run_id);
        } else {
            info!("Scheduled run finished: {} task(s) succeeded ({})", total, run_id);
        }
        result
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn failure_kind<E>(failure: &TaskFailure<E>) -> &'static str {
    match failure {
        TaskFailure::Failed(_) => "task error",
        TaskFailure::Panicked(_) => "panic",
        TaskFailure::Abandoned => "abandoned",
    }
}

/// Runs tasks one at a time; completion order always equals input order
pub struct SerialRunner;

impl SerialRunner {
    pub async fn run<T, E>(tasks: Vec<Task<T, E>>) -> Result<Vec<T>, AggregateFailure<E>>
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        Scheduler::new(SchedulingStrategy::Sequential).run(tasks).await
    }
}

/// Run tasks with at most `limit` in flight (`0` = unbounded)
pub async fn parallel<T, E>(tasks: Vec<Task<T, E>>, limit: usize) -> Result<Vec<T>, AggregateFailure<E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    Scheduler::with_limit(limit).run(tasks).await
}

/// Run tasks strictly one after another
pub async fn serial<T, E>(tasks: Vec<Task<T, E>>) -> Result<Vec<T>, AggregateFailure<E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    SerialRunner::run(tasks).await
}

pub use self::serial as series;
