//! Task abstraction - a startable unit of asynchronous work

use crate::core::continuation::{Continuation, ContinuationDropped};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Boxed, sendable future used throughout the crate
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// An operation that settles exactly once with a value or a failure.
///
/// Tasks are lazy: nothing runs until the scheduler polls the task for the
/// first time. Handing a task to a scheduler moves it, so a task can only
/// ever be started once.
pub struct Task<T, E> {
    inner: BoxFuture<Result<T, E>>,
}

impl<T, E> Task<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Wrap a future as a task
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            inner: Box::pin(future),
        }
    }

    /// Build a task from a closure that is only invoked once the task starts
    pub fn from_fn<F, Fut>(start: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::new(async move { start().await })
    }

    /// A task that succeeds immediately
    pub fn ok(value: T) -> Self {
        Self::new(async move { Ok(value) })
    }

    /// A task that fails immediately
    pub fn err(error: E) -> Self {
        Self::new(async move { Err(error) })
    }

    /// Adapt a callback-completing operation into a task.
    ///
    /// `register` runs when the task starts and receives the continuation it
    /// must eventually resolve. If the continuation is dropped without being
    /// resolved the task fails with [`ContinuationDropped`].
    pub fn from_callback<F>(register: F) -> Self
    where
        F: FnOnce(Continuation<T, E>) + Send + 'static,
        E: From<ContinuationDropped>,
    {
        Self::new(async move {
            let (continuation, receiver) = Continuation::channel();
            register(continuation);
            match receiver.await {
                Ok(result) => result,
                Err(_) => Err(E::from(ContinuationDropped)),
            }
        })
    }
}

impl<T, E> Future for Task<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<T, E> fmt::Debug for Task<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}
