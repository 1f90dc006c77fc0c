//! Concurrency-limited batch runner.
//!
//! Runs a batch of independent tasks with at most `concurrency` in flight,
//! each attempt under a hard timeout and each task under a bounded retry.
//! Settle-all: one task failing never aborts its siblings.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::options::BatchOptions;

/// Terminal failure of one task.
#[derive(Debug, Clone, Error)]
pub enum BatchError<E> {
    /// Every attempt failed; carries the last error.
    #[error("task failed: {0}")]
    Failed(E),

    /// The last attempt exceeded the task timeout.
    #[error("task timed out after {0:?}")]
    TimedOut(Duration),
}

/// Outcome of one task, in input order.
#[derive(Debug)]
pub struct BatchOutcome<R, E> {
    pub index: usize,
    /// Attempts made, including the first.
    pub attempts: u32,
    pub result: Result<R, BatchError<E>>,
}

impl<R, E> BatchOutcome<R, E> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Batch runner with a shared concurrency ceiling.
pub struct BatchRunner {
    opts: BatchOptions,
    semaphore: Arc<Semaphore>,
}

impl BatchRunner {
    pub fn new(opts: BatchOptions) -> Self {
        let permits = opts.concurrency.max(1);
        Self {
            opts,
            semaphore: Arc::new(Semaphore::new(permits)),
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.opts
    }

    /// Available concurrency slots right now.
    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Run `task` over every item, retrying any failure. Each retry calls
    /// `task` afresh.
    pub async fn run<'a, T, R, E, F, Fut>(
        &self,
        items: &'a [T],
        task: F,
    ) -> Vec<BatchOutcome<R, E>>
    where
        F: Fn(&'a T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: std::fmt::Display,
    {
        self.run_with(items, task, |_| true).await
    }

    /// Like [`run`](Self::run), but a failure is only retried when
    /// `retryable` accepts it. Timeouts are always retried.
    pub async fn run_with<'a, T, R, E, F, Fut, P>(
        &self,
        items: &'a [T],
        task: F,
        retryable: P,
    ) -> Vec<BatchOutcome<R, E>>
    where
        F: Fn(&'a T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: std::fmt::Display,
        P: Fn(&E) -> bool,
    {
        let task = &task;
        let retryable = &retryable;
        let futures = items.iter().enumerate().map(|(index, item)| async move {
            // The semaphore is never closed, so acquire cannot fail.
            let _permit = self.semaphore.acquire().await.ok();
            self.run_one(index, item, task, retryable).await
        });

        let outcomes = join_all(futures).await;
        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        debug!("Batch of {} settled, {} failed", outcomes.len(), failed);
        outcomes
    }

    async fn run_one<'a, T, R, E, F, Fut, P>(
        &self,
        index: usize,
        item: &'a T,
        task: &F,
        retryable: &P,
    ) -> BatchOutcome<R, E>
    where
        F: Fn(&'a T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: std::fmt::Display,
        P: Fn(&E) -> bool,
    {
        let max_attempts = self.opts.retry_budget + 1;
        let mut attempts = 0;

        loop {
            attempts += 1;
            // Dropping the timed-out future cancels it; a late result is discarded.
            let error = match tokio::time::timeout(self.opts.task_timeout, task(item)).await {
                Ok(Ok(value)) => {
                    return BatchOutcome {
                        index,
                        attempts,
                        result: Ok(value),
                    };
                }
                Ok(Err(e)) => BatchError::Failed(e),
                Err(_) => BatchError::TimedOut(self.opts.task_timeout),
            };

            let give_up = match &error {
                BatchError::Failed(e) => !retryable(e),
                BatchError::TimedOut(_) => false,
            };
            if give_up || attempts >= max_attempts {
                warn!("Task {} gave up after {} attempts: {}", index, attempts, error);
                return BatchOutcome {
                    index,
                    attempts,
                    result: Err(error),
                };
            }

            debug!("Task {} attempt {}/{} failed: {}", index, attempts, max_attempts, error);
            tokio::time::sleep(self.opts.retry_delay).await;
        }
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
