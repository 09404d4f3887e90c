//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskflow::{Settlement, Task};
use tokio::time::Instant;

/// A task that settles `ms` milliseconds after `origin` with the value `ms`.
///
/// The deadline is measured from a shared origin rather than from when the
/// task starts, so a task admitted late whose deadline already passed
/// settles as soon as it is polled.
pub fn delay_from(origin: Instant, ms: u64) -> Task<u64, String> {
    Task::new(async move {
        tokio::time::sleep_until(origin + Duration::from_millis(ms)).await;
        Ok(ms)
    })
}

pub fn delays_from(origin: Instant, latencies: &[u64]) -> Vec<Task<u64, String>> {
    latencies.iter().map(|&ms| delay_from(origin, ms)).collect()
}

/// A task that sleeps `ms` milliseconds once started
pub fn delay(ms: u64) -> Task<u64, String> {
    Task::new(async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(ms)
    })
}

/// A task that sleeps `ms` milliseconds, then fails with `message`
pub fn failing_delay(ms: u64, message: &str) -> Task<u64, String> {
    let message = message.to_string();
    Task::new(async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Err(message)
    })
}

/// Records settlements in the order the scheduler reports them
#[derive(Clone, Default)]
pub struct CompletionLog {
    entries: Arc<Mutex<Vec<(usize, Option<u64>)>>>,
}

impl CompletionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(&self) -> impl Fn(&Settlement<u64, String>) + Send + Sync + 'static {
        let entries = self.entries.clone();
        move |settlement: &Settlement<u64, String>| {
            entries
                .lock()
                .unwrap()
                .push((settlement.index, settlement.value().copied()));
        }
    }

    /// Values of successful settlements, in completion order
    pub fn values(&self) -> Vec<u64> {
        self.entries.lock().unwrap().iter().filter_map(|(_, v)| *v).collect()
    }

    /// Indices of all settlements, in completion order
    pub fn indices(&self) -> Vec<usize> {
        self.entries.lock().unwrap().iter().map(|(i, _)| *i).collect()
    }
}
