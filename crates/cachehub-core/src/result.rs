//! Convenience result type alias for CacheHub.

use crate::error::CacheError;

/// A specialized `Result` type for cache operations.
///
/// Every public entry point in the workspace returns this so that callers
/// match on a single error type regardless of the backend involved.
pub type CacheResult<T> = Result<T, CacheError>;
