//! Sequential batch operations with per-item outcomes.
//!
//! A [`BatchRunner`] applies an async operation to each item in turn. A
//! failing item is recorded in the [`BatchReport`] and the batch carries
//! on with the next one.
//!
//! ```no_run
//! use issuekit_github::batch::BatchRunner;
//!
//! # async fn example(repo: issuekit_github::RepoContext) {
//! let issues = repo.issues();
//! let report = BatchRunner::new()
//!     .on_progress(|current, total, number: &u64| {
//!         eprintln!("[{current}/{total}] #{number}");
//!     })
//!     .run([12, 15, 19], |number| issues.reopen(number))
//!     .await;
//!
//! for entry in report.failed() {
//!     eprintln!("#{} failed: {:?}", entry.item, entry.outcome);
//! }
//! # }
//! ```

use std::fmt;
use std::future::Future;

use tracing::{debug, info, warn};

use crate::error::Result;

/// Callback invoked after each item with `(current, total, item)`;
/// `current` is 1-based.
pub type ProgressCallback<'a, I> = Box<dyn FnMut(usize, usize, &I) + Send + 'a>;

/// What happened to one item.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome<T> {
    Success(T),
    /// The operation failed; `code` is [`Error::code`](crate::Error::code).
    Failure { message: String, code: u16 },
}

impl<T> BatchOutcome<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// The successful value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure { .. } => None,
        }
    }
}

/// One processed item.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry<I, T> {
    /// Zero-based position in the input.
    pub index: usize,
    pub item: I,
    pub outcome: BatchOutcome<T>,
}

/// Every item's outcome, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport<I, T> {
    entries: Vec<BatchEntry<I, T>>,
}

impl<I, T> BatchReport<I, T> {
    #[must_use]
    pub fn entries(&self) -> &[BatchEntry<I, T>] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<BatchEntry<I, T>> {
        self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &BatchEntry<I, T>> {
        self.entries.iter().filter(|e| e.outcome.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &BatchEntry<I, T>> {
        self.entries.iter().filter(|e| e.outcome.is_failure())
    }

    /// Returns `true` if no item failed.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.entries.iter().all(|e| e.outcome.is_success())
    }
}

/// Runs an operation over items one at a time.
pub struct BatchRunner<'a, I> {
    on_progress: Option<ProgressCallback<'a, I>>,
}

impl<I> Default for BatchRunner<'_, I> {
    fn default() -> Self {
        Self { on_progress: None }
    }
}

impl<I> fmt::Debug for BatchRunner<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchRunner")
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl<'a, I: Clone> BatchRunner<'a, I> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the progress callback.
    #[must_use]
    pub fn on_progress(mut self, callback: impl FnMut(usize, usize, &I) + Send + 'a) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Applies `op` to every item in order.
    ///
    /// Errors never abort the batch; each one becomes a
    /// [`BatchOutcome::Failure`] entry.
    pub async fn run<T, F, Fut>(mut self, items: impl IntoIterator<Item = I>, mut op: F) -> BatchReport<I, T>
    where
        F: FnMut(I) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let items: Vec<I> = items.into_iter().collect();
        let total = items.len();
        let mut entries = Vec::with_capacity(total);
        debug!(total, "starting batch");

        for (index, item) in items.into_iter().enumerate() {
            let outcome = match op(item.clone()).await {
                Ok(value) => BatchOutcome::Success(value),
                Err(e) => {
                    warn!(index, code = e.code(), error = %e, "batch item failed");
                    BatchOutcome::Failure {
                        message: e.message(),
                        code: e.code(),
                    }
                }
            };

            if let Some(callback) = self.on_progress.as_mut() {
                callback(index + 1, total, &item);
            }
            entries.push(BatchEntry {
                index,
                item,
                outcome,
            });
        }

        let report = BatchReport { entries };
        info!(
            total,
            succeeded = report.success_count(),
            failed = report.failure_count(),
            "batch finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn failures_do_not_abort_the_batch() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&calls);

        let report = BatchRunner::new()
            .on_progress(move |current, total, item: &&str| {
                seen.lock().unwrap().push((current, total, (*item).to_string()));
            })
            .run(["a", "b", "c"], |item| async move {
                if item == "b" {
                    Err(Error::invalid("item", "b is cursed"))
                } else {
                    Ok(item.to_uppercase())
                }
            })
            .await;

        assert_eq!(report.len(), 3);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);
        assert!(!report.is_complete_success());

        let entries = report.entries();
        assert_eq!(entries[0].outcome.value().map(String::as_str), Some("A"));
        assert_eq!(
            entries[1].outcome,
            BatchOutcome::Failure {
                message: "b is cursed".to_string(),
                code: 400
            }
        );
        assert_eq!(entries[2].outcome.value().map(String::as_str), Some("C"));
        assert_eq!(entries[2].index, 2);

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                (1, 3, "a".to_string()),
                (2, 3, "b".to_string()),
                (3, 3, "c".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn items_run_in_order() {
        let mut order = Vec::new();
        let report = BatchRunner::new()
            .run(vec![3_u64, 1, 2], |n| {
                order.push(n);
                async move { Ok(n * 10) }
            })
            .await;

        assert_eq!(order, vec![3, 1, 2]);
        let values: Vec<u64> = report
            .succeeded()
            .filter_map(|e| e.outcome.value().copied())
            .collect();
        assert_eq!(values, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn empty_batch() {
        let report: BatchReport<u64, ()> = BatchRunner::new().run(Vec::new(), |_| async { Ok(()) }).await;
        assert!(report.is_empty());
        assert!(report.is_complete_success());
    }
}
