//! Waterfall - threads a value through an ordered list of steps

use crate::core::{BoxFuture, WaterfallError};
use std::future::Future;
use tracing::{debug, warn};

type WaterfallStep<T, E> = Box<dyn FnOnce(T) -> BoxFuture<Result<T, E>> + Send>;

/// Ordered list of steps, each consuming the previous step's output.
///
/// Steps run strictly one after another. The first failing step ends the
/// run; later steps are never invoked.
pub struct Waterfall<T, E> {
    steps: Vec<WaterfallStep<T, E>>,
}

impl<T, E> Waterfall<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append an asynchronous step
    pub fn step<F, Fut>(mut self, step: F) -> Self
    where
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.steps
            .push(Box::new(move |value| Box::pin(step(value)) as BoxFuture<Result<T, E>>));
        self
    }

    /// Append a synchronous step
    pub fn map<F>(self, step: F) -> Self
    where
        F: FnOnce(T) -> Result<T, E> + Send + 'static,
    {
        self.step(move |value| async move { step(value) })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run all steps starting from `initial`
    pub async fn run(self, initial: T) -> Result<T, WaterfallError<E>> {
        let total = self.steps.len();
        let mut value = initial;

        for (step, run_step) in self.steps.into_iter().enumerate() {
            debug!("Running waterfall step {}/{}", step + 1, total);
            value = match run_step(value).await {
                Ok(next) => next,
                Err(error) => {
                    warn!("Waterfall stopped at step {}/{}", step + 1, total);
                    return Err(WaterfallError { step, error });
                }
            };
        }

        Ok(value)
    }
}

impl<T, E> Default for Waterfall<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn incr(a: u32) -> Result<u32, String> {
        Ok(a + 1)
    }

    async fn incr_later(a: u32) -> Result<u32, String> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(a + 1)
    }

    #[tokio::test]
    async fn test_sync_steps() {
        let result = Waterfall::new().map(incr).map(incr).map(incr).map(incr).run(0).await;
        assert_eq!(result.unwrap(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_steps() {
        let result = Waterfall::new()
            .step(incr_later)
            .step(incr_later)
            .step(incr_later)
            .step(incr_later)
            .run(0)
            .await;
        assert_eq!(result.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_empty_returns_initial() {
        let waterfall: Waterfall<&str, String> = Waterfall::new();
        assert!(waterfall.is_empty());
        assert_eq!(waterfall.run("seed").await.unwrap(), "seed");
    }

    #[tokio::test]
    async fn test_failure_skips_remaining_steps() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = Waterfall::new()
            .map(incr)
            .map(|_| Err("broken".to_string()))
            .map(move |a| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(a)
            })
            .run(0)
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.step, 1);
        assert_eq!(err.error, "broken");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
