//! Failure types shared by the scheduler and the sequential combinators

use std::fmt;
use thiserror::Error;

/// Failure of a single task
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskFailure<E> {
    /// The task settled with its own error
    #[error("{0}")]
    Failed(E),

    /// The task panicked while running
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The task was lost before it settled (e.g. aborted during shutdown)
    #[error("task was abandoned before settling")]
    Abandoned,
}

impl<E> TaskFailure<E> {
    /// The task's own error, if it reported one
    pub fn into_error(self) -> Option<E> {
        match self {
            TaskFailure::Failed(error) => Some(error),
            TaskFailure::Panicked(_) | TaskFailure::Abandoned => None,
        }
    }
}

/// A failure tagged with the index of the task that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFailure<E> {
    pub index: usize,
    pub failure: TaskFailure<E>,
}

/// Scheduler-level failure: the first task failure observed.
///
/// Failures observed afterwards do not replace it; they are kept in
/// `discarded` in the order they were observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateFailure<E> {
    /// Index of the task whose failure was observed first
    pub index: usize,

    /// The first failure
    pub failure: TaskFailure<E>,

    /// Later failures, in observation order
    pub discarded: Vec<IndexedFailure<E>>,
}

impl<E> AggregateFailure<E> {
    /// Unwrap the first failure
    pub fn into_failure(self) -> TaskFailure<E> {
        self.failure
    }

    /// Total number of failed tasks
    pub fn failure_count(&self) -> usize {
        1 + self.discarded.len()
    }
}

impl<E: fmt::Display> fmt::Display for AggregateFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task #{} failed: {}", self.index, self.failure)?;
        if !self.discarded.is_empty() {
            write!(f, " ({} later failure(s) discarded)", self.discarded.len())?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for AggregateFailure<E> {}

/// A waterfall step failed; later steps never ran
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step #{step} failed: {error}")]
pub struct WaterfallError<E> {
    pub step: usize,
    pub error: E,
}

/// A fold step failed or broke its continuation contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoldError<E> {
    #[error("element #{index} failed: {error}")]
    Step { index: usize, error: E },

    #[error("continuation for element #{index} was dropped without being resolved")]
    ContinuationDropped { index: usize },
}

impl<E> FoldError<E> {
    /// Index of the element at which the fold stopped
    pub fn index(&self) -> usize {
        match self {
            FoldError::Step { index, .. } | FoldError::ContinuationDropped { index } => *index,
        }
    }
}
