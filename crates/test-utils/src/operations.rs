//! Canned operation functions for building commands in tests.

use std::time::Duration;

use anyhow::anyhow;
use cmdgate::command::OperationFuture;
use cmdgate::{CancellationToken, OperationError};

/// Sleep for `delay`, then succeed with a clone of `value`. Ignores the token.
pub fn succeed_after<P, R>(
    delay: Duration,
    value: R,
) -> impl Fn(P, CancellationToken) -> OperationFuture<R> + Send + Sync + 'static
where
    P: Send + 'static,
    R: Clone + Send + Sync + 'static,
{
    move |_parameter: P, _token: CancellationToken| -> OperationFuture<R> {
        let value = value.clone();
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(value)
        })
    }
}

/// Wait until the token fires (returning `Canceled`) or `limit` elapses
/// (returning `Ok`).
pub fn wait_for_cancel<P>(
    limit: Duration,
) -> impl Fn(P, CancellationToken) -> OperationFuture<()> + Send + Sync + 'static
where
    P: Send + 'static,
{
    move |_parameter: P, token: CancellationToken| -> OperationFuture<()> {
        Box::pin(async move {
            tokio::select! {
                _ = token.cancelled() => Err(OperationError::Canceled),
                _ = tokio::time::sleep(limit) => Ok(()),
            }
        })
    }
}

/// Fail right away with `message` as the error.
pub fn fail_with<P, R>(
    message: &str,
) -> impl Fn(P, CancellationToken) -> OperationFuture<R> + Send + Sync + 'static
where
    P: Send + 'static,
    R: Send + 'static,
{
    let message = message.to_string();
    move |_parameter: P, _token: CancellationToken| -> OperationFuture<R> {
        let message = message.clone();
        Box::pin(async move { Err(OperationError::Failed(anyhow!(message))) })
    }
}
