//! Argument guards used at every public entry point.

use crate::error::CacheError;
use crate::result::CacheResult;

/// Returns `true` if the value is absent, empty, or only whitespace.
pub fn is_null_or_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Ensure a required string parameter is present and not blank.
///
/// Returns the value unchanged on success, surrounding whitespace included,
/// and an
/// [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
/// error naming `param` otherwise.
pub fn ensure_not_blank<'a>(value: Option<&'a str>, param: &str) -> CacheResult<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CacheError::invalid_argument(format!(
            "'{param}' must not be null or blank"
        ))),
    }
}

/// Ensure a required value is present.
pub fn ensure_present<T>(value: Option<T>, param: &str) -> CacheResult<T> {
    value.ok_or_else(|| CacheError::invalid_argument(format!("'{param}' must not be null")))
}

/// Pick `name` when it is not blank, otherwise fall back to `default`.
pub fn name_or(name: Option<&str>, default: &str) -> String {
    match name {
        Some(n) if !n.trim().is_empty() => n.to_string(),
        _ => default.to_string(),
    }
}
