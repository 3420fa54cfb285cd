//! Bounded and cancellable execution of cache calls.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use cachehub_core::error::{CacheError, ErrorKind};
use cachehub_core::result::CacheResult;

/// Run a backend call under a time limit.
///
/// An elapsed limit is reported as `ProviderUnavailable`; the call's own
/// error is returned untouched.
pub(crate) async fn bounded<T, F>(
    provider: &str,
    operation: &str,
    limit: Duration,
    call: F,
) -> CacheResult<T>
where
    F: Future<Output = CacheResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(elapsed) => Err(CacheError::with_source(
            ErrorKind::ProviderUnavailable,
            format!(
                "Cache provider '{provider}' did not complete {operation} within {}ms",
                limit.as_millis()
            ),
            elapsed,
        )),
    }
}

/// Run any cache operation until it completes or `token` is cancelled.
///
/// A token that is already cancelled prevents the operation from starting.
/// Once started, a single-command write either reaches the backend or it
/// does not; there is no partially applied state to observe.
pub async fn cancellable<T, F>(token: &CancellationToken, operation: F) -> CacheResult<T>
where
    F: Future<Output = CacheResult<T>>,
{
    tokio::select! {
        biased;
        () = token.cancelled() => Err(CacheError::cancelled("Cache operation cancelled")),
        result = operation => result,
    }
}
