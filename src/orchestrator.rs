//! Bounded-concurrency batch execution.
//!
//! [`BatchOrchestrator::run`] drives one task per item with at most
//! `concurrency` tasks in flight. Every dispatched task runs to completion;
//! a failing (or panicking) task only affects its own item. Outcomes are
//! partitioned into a [`BatchResult`] where every input item lands on exactly
//! one side.
//!
//! Tasks are polled on the caller's task rather than spawned, so the bound
//! holds without a semaphore and observer callbacks all run on the single
//! completion path.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures_util::{FutureExt, StreamExt, stream};
use tracing::{debug, warn};

use crate::{MimirError, Result};

/// Default number of tasks in flight, sized for provider rate limits.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Disjoint partition of a batch's outcomes.
#[derive(Debug)]
pub struct BatchResult<T = String> {
    /// Successful items in completion order.
    pub results: Vec<(String, T)>,
    /// Failed items in completion order.
    pub errors: Vec<(String, MimirError)>,
}

impl<T> BatchResult<T> {
    /// Number of items in the batch.
    pub fn total(&self) -> usize {
        self.results.len() + self.errors.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Per-item lifecycle callbacks.
///
/// `on_start` fires when a task is dispatched; `on_success` and `on_error`
/// fire in completion order, not input order. A panicking callback is caught
/// and logged; it never affects task execution or the batch result.
pub trait BatchObserver<T>: Send + Sync {
    fn on_start(&self, _item: &str) {}
    fn on_success(&self, _item: &str, _output: &T) {}
    fn on_error(&self, _item: &str, _error: &MimirError) {}
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl<T> BatchObserver<T> for NoopObserver {}

/// Runs independent tasks with bounded parallelism.
#[derive(Debug, Clone, Copy)]
pub struct BatchOrchestrator {
    concurrency: usize,
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl BatchOrchestrator {
    /// Create an orchestrator; a limit of 0 is treated as 1.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run `task` once per item.
    ///
    /// The task factory is invoked lazily as slots free up, so neither task
    /// construction nor execution ever exceeds the concurrency limit.
    pub async fn run<T, F, Fut>(
        &self,
        items: Vec<String>,
        task: F,
        observer: &dyn BatchObserver<T>,
    ) -> BatchResult<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let task = &task;
        let mut results = Vec::with_capacity(items.len());
        let mut errors = Vec::new();

        let mut outcomes = stream::iter(items)
            .map(|item| {
                notify(|| observer.on_start(&item));
                async move {
                    let name = item.clone();
                    let outcome = AssertUnwindSafe(async move { task(name).await })
                        .catch_unwind()
                        .await;
                    (item, outcome)
                }
            })
            .buffer_unordered(self.concurrency);

        while let Some((item, outcome)) = outcomes.next().await {
            let outcome = outcome.unwrap_or_else(|payload| {
                warn!(
                    item = item.as_str(),
                    panic = panic_message(&*payload),
                    "task panicked"
                );
                Err(MimirError::TaskPanicked(item.clone()))
            });
            match outcome {
                Ok(output) => {
                    debug!(item = item.as_str(), "task succeeded");
                    notify(|| observer.on_success(&item, &output));
                    results.push((item, output));
                }
                Err(e) => {
                    debug!(item = item.as_str(), error = %e, "task failed");
                    notify(|| observer.on_error(&item, &e));
                    errors.push((item, e));
                }
            }
        }

        BatchResult { results, errors }
    }
}

/// Invoke an observer callback, containing any panic.
fn notify(callback: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(callback)) {
        warn!(
            panic = panic_message(&*payload),
            "batch observer callback panicked"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
