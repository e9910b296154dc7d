//! Bulk fan-out over independent legacy calls.
//!
//! The endpoints accept one selection per request, so bulk workloads are
//! one call per input item. The join is ordered and non-cancelling: a
//! failing sibling never aborts calls still in flight, and the aggregate
//! lines up with the input item for item.

use std::future::Future;

use futures_util::future::join_all;

use crate::error::GatewayError;

/// Run `operation` once per item and collect per-item results in input
/// order. Callers decide whether partial failure fails the whole batch.
pub async fn bulk<I, T, F, Fut>(items: I, operation: F) -> Vec<Result<T, GatewayError>>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    join_all(items.into_iter().map(operation)).await
}
