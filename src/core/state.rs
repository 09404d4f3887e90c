//! Per-invocation scheduling state

use crate::core::error::{AggregateFailure, IndexedFailure, TaskFailure};
use chrono::{DateTime, Utc};

/// Outcome of one task, as delivered to progress handlers
#[derive(Debug, Clone)]
pub struct Settlement<T, E> {
    /// Position of the task in the input
    pub index: usize,

    /// What the task settled with
    pub outcome: Result<T, TaskFailure<E>>,

    /// Number of tasks settled so far, this one included
    pub finished: usize,

    /// Total number of tasks in the invocation
    pub total: usize,

    /// When the settlement was observed
    pub settled_at: DateTime<Utc>,
}

impl<T, E> Settlement<T, E> {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The successful value, if any
    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// Fraction of the invocation that has settled (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.finished as f64 / self.total as f64
    }
}

/// Book-keeping for a single scheduler run.
///
/// Owned by exactly one invocation and dropped when it returns. Only the
/// collector loop mutates it, at admission and settlement points.
#[derive(Debug)]
pub struct SchedulerState<T, E> {
    total: usize,
    limit: usize,
    next: usize,
    running: usize,
    finished: usize,
    results: Vec<Option<T>>,
    first_failure: Option<IndexedFailure<E>>,
    discarded: Vec<IndexedFailure<E>>,
}

impl<T, E> SchedulerState<T, E> {
    /// Create state for `total` tasks with an already-resolved limit
    pub fn new(total: usize, limit: usize) -> Self {
        let mut results = Vec::with_capacity(total);
        results.resize_with(total, || None);
        Self {
            total,
            limit: limit.max(1),
            next: 0,
            running: 0,
            finished: 0,
            results,
            first_failure: None,
            discarded: Vec::new(),
        }
    }

    /// Claim the lowest-index unstarted task if a slot is free
    pub fn admit(&mut self) -> Option<usize> {
        if self.next >= self.total || self.running >= self.limit {
            return None;
        }
        let index = self.next;
        self.next += 1;
        self.running += 1;
        Some(index)
    }

    /// Record the settlement of task `index`
    pub fn settle(&mut self, index: usize, outcome: Result<T, TaskFailure<E>>) {
        self.running = self.running.saturating_sub(1);
        self.finished += 1;

        match outcome {
            Ok(value) => {
                if let Some(slot) = self.results.get_mut(index) {
                    debug_assert!(slot.is_none(), "task {} settled twice", index);
                    *slot = Some(value);
                }
            }
            Err(failure) => {
                let failure = IndexedFailure { index, failure };
                if self.first_failure.is_none() {
                    self.first_failure = Some(failure);
                } else {
                    self.discarded.push(failure);
                }
            }
        }
    }

    /// All tasks have settled
    pub fn is_done(&self) -> bool {
        self.finished == self.total
    }

    pub fn running(&self) -> usize {
        self.running
    }

    pub fn finished(&self) -> usize {
        self.finished
    }

    pub fn has_failed(&self) -> bool {
        self.first_failure.is_some()
    }

    /// Calculate progress percentage (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.finished as f64 / self.total as f64
    }

    /// Turn the finished state into the invocation's result.
    ///
    /// Slots that never received a value while no failure was recorded mean
    /// a task was lost; that is reported as [`TaskFailure::Abandoned`].
    pub fn into_outcome(self) -> Result<Vec<T>, AggregateFailure<E>> {
        if let Some(first) = self.first_failure {
            return Err(AggregateFailure {
                index: first.index,
                failure: first.failure,
                discarded: self.discarded,
            });
        }

        let mut values = Vec::with_capacity(self.total);
        for (index, slot) in self.results.into_iter().enumerate() {
            match slot {
                Some(value) => values.push(value),
                None => {
                    return Err(AggregateFailure {
                        index,
                        failure: TaskFailure::Abandoned,
                        discarded: Vec::new(),
                    })
                }
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_respects_limit() {
        let mut state: SchedulerState<u32, String> = SchedulerState::new(4, 2);
        assert_eq!(state.admit(), Some(0));
        assert_eq!(state.admit(), Some(1));
        assert_eq!(state.admit(), None);
        assert_eq!(state.running(), 2);

        state.settle(1, Ok(10));
        assert_eq!(state.admit(), Some(2));
        assert_eq!(state.admit(), None);
    }

    #[test]
    fn test_results_are_index_aligned() {
        let mut state: SchedulerState<&str, String> = SchedulerState::new(3, 3);
        while state.admit().is_some() {}

        state.settle(2, Ok("c"));
        state.settle(0, Ok("a"));
        state.settle(1, Ok("b"));

        assert!(state.is_done());
        assert_eq!(state.into_outcome().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_first_failure_is_kept() {
        let mut state: SchedulerState<u32, String> = SchedulerState::new(3, 3);
        while state.admit().is_some() {}

        state.settle(2, Err(TaskFailure::Failed("first".to_string())));
        state.settle(0, Ok(1));
        state.settle(1, Err(TaskFailure::Failed("second".to_string())));

        let failure = state.into_outcome().unwrap_err();
        assert_eq!(failure.index, 2);
        assert_eq!(failure.failure, TaskFailure::Failed("first".to_string()));
        assert_eq!(failure.discarded.len(), 1);
        assert_eq!(failure.discarded[0].index, 1);
    }

    #[test]
    fn test_failure_does_not_stop_admission() {
        let mut state: SchedulerState<u32, String> = SchedulerState::new(2, 1);
        assert_eq!(state.admit(), Some(0));
        state.settle(0, Err(TaskFailure::Failed("boom".to_string())));
        assert!(state.has_failed());
        assert_eq!(state.admit(), Some(1));
    }

    #[test]
    fn test_empty_state_is_done() {
        let state: SchedulerState<u32, String> = SchedulerState::new(0, 0);
        assert!(state.is_done());
        assert_eq!(state.progress(), 1.0);
        assert_eq!(state.into_outcome().unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_progress() {
        let mut state: SchedulerState<u32, String> = SchedulerState::new(4, 4);
        while state.admit().is_some() {}
        assert_eq!(state.progress(), 0.0);

        state.settle(0, Ok(1));
        state.settle(1, Ok(2));
        assert_eq!(state.progress(), 0.5);
    }

    #[test]
    fn test_missing_result_is_abandoned() {
        let state: SchedulerState<u32, String> = SchedulerState::new(1, 1);
        let failure = state.into_outcome().unwrap_err();
        assert_eq!(failure.index, 0);
        assert_eq!(failure.failure, TaskFailure::Abandoned);
    }
}
