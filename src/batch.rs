//! Running batches of remote operations
//!
//! Every operation in a batch runs to completion even when one fails, so nothing is left
//! half-sent to the debuggee when we report back.

use std::future::Future;

use crate::Result;

use futures::future::join_all;

/// Run all the futures concurrently and wait for every one to settle. Returns all the
/// results in order or the first failure in order.
pub async fn run_batch<T, I>(batch: I) -> Result<Vec<T>>
where
    I: IntoIterator,
    I::Item: Future<Output = Result<T>>,
{
    join_all(batch).await.into_iter().collect()
}

/// Run batch `first` fully, and only if all of it succeeded run batch `second`.
///
/// Nothing from `second` is started before `first` has settled.
pub async fn run_batches_in_order<A, B, I, J>(first: I, second: J) -> Result<(Vec<A>, Vec<B>)>
where
    I: IntoIterator,
    I::Item: Future<Output = Result<A>>,
    J: IntoIterator,
    J::Item: Future<Output = Result<B>>,
{
    let first = run_batch(first).await?;
    let second = run_batch(second).await?;
    Ok((first, second))
}
