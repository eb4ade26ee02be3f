//! Bounded concurrent fan-out / fan-in
//!
//! Runs one task per work item with at most `concurrency` tasks in flight
//! and collects results as they complete. The first observed failure aborts
//! the run: the error propagates to the caller, in-flight tasks are cancelled
//! by drop, and results collected so far are discarded.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;

/// Run `task` over every item with bounded concurrency.
///
/// Items are drawn in order to keep `concurrency` tasks in flight; results
/// arrive in completion order, not submission order. A `concurrency` of
/// zero is treated as one.
pub async fn fan_out<I, F, Fut, T, E>(items: I, concurrency: usize, task: F) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    stream::iter(items.into_iter().map(task))
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await
}
