//! Asynchronous left fold with short-circuit on failure
//!
//! Each element is handed to the step together with a [`Continuation`]. The
//! fold waits for that continuation before touching the next element, so
//! elements are processed strictly in order. The wait is a plain loop over
//! one-shot receivers, which keeps stack depth constant however long the
//! input is and whether steps resolve synchronously or later.

use crate::core::{Continuation, FoldError};
use std::future::Future;
use tracing::{debug, warn};

/// Fold driven by a continuation-passing step.
///
/// The step is called as `step(accumulator, element, next)` and must resolve
/// `next` exactly once, either right away or from some later task. Dropping
/// `next` unresolved ends the fold with [`FoldError::ContinuationDropped`].
pub struct Fold<S> {
    step: S,
}

impl<S> Fold<S> {
    pub fn new(step: S) -> Self {
        Self { step }
    }

    /// Fold `elements` into `initial`, stopping at the first failure
    pub async fn run<I, A, E>(mut self, elements: I, initial: A) -> Result<A, FoldError<E>>
    where
        I: IntoIterator,
        S: FnMut(A, I::Item, Continuation<A, E>),
    {
        let mut accumulator = initial;

        for (index, element) in elements.into_iter().enumerate() {
            let (next, receiver) = Continuation::channel();
            (self.step)(accumulator, element, next);

            accumulator = match receiver.await {
                Ok(Ok(value)) => value,
                Ok(Err(error)) => {
                    warn!("Fold stopped at element #{}", index);
                    return Err(FoldError::Step { index, error });
                }
                Err(_) => {
                    warn!("Fold step for element #{} dropped its continuation", index);
                    return Err(FoldError::ContinuationDropped { index });
                }
            };
        }

        debug!("Fold finished");
        Ok(accumulator)
    }

    /// Like [`Fold::run`], but reports the outcome to a final callback
    pub async fn run_with_callback<I, A, E, D>(self, elements: I, initial: A, done: D)
    where
        I: IntoIterator,
        S: FnMut(A, I::Item, Continuation<A, E>),
        D: FnOnce(Result<A, FoldError<E>>),
    {
        done(self.run(elements, initial).await);
    }
}

/// Fold with an async step that returns the next accumulator directly
pub async fn fold_async<I, A, E, F, Fut>(elements: I, initial: A, mut step: F) -> Result<A, FoldError<E>>
where
    I: IntoIterator,
    F: FnMut(A, I::Item) -> Fut,
    Fut: Future<Output = Result<A, E>>,
{
    let mut accumulator = initial;

    for (index, element) in elements.into_iter().enumerate() {
        accumulator = match step(accumulator, element).await {
            Ok(value) => value,
            Err(error) => {
                warn!("Fold stopped at element #{}", index);
                return Err(FoldError::Step { index, error });
            }
        };
    }

    Ok(accumulator)
}
