//! One-shot continuations for callback-style steps

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

/// Returned when a continuation was dropped without ever being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("continuation dropped without being resolved")]
pub struct ContinuationDropped;

/// Single-use handle a step resolves with its result.
///
/// Every resolving method consumes the continuation, so it can fire at most
/// once. The waiting side notices when it is dropped unresolved.
#[derive(Debug)]
pub struct Continuation<A, E> {
    sender: oneshot::Sender<Result<A, E>>,
}

impl<A, E> Continuation<A, E> {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Result<A, E>>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Resolve with either the next value or a failure
    pub fn resolve(self, result: Result<A, E>) {
        if self.sender.send(result).is_err() {
            debug!("Continuation resolved after its receiver went away");
        }
    }

    pub fn ok(self, value: A) {
        self.resolve(Ok(value));
    }

    pub fn fail(self, error: E) {
        self.resolve(Err(error));
    }
}
