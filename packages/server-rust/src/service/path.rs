//! Operation name extraction from the request path.

use opserve_core::OperationError;

/// Message returned for paths that do not name an operation.
pub const INVALID_PATH: &str = "URL does not start with /<operationName>";

/// Returns the operation name addressed by `path`: everything after the
/// leading `/`.
///
/// # Errors
///
/// Returns a `BadRequest` error if `path` does not start with `/` or if the
/// first segment after it is empty (`/`, `//ping`).
pub fn operation_name(path: &str) -> Result<&str, OperationError> {
    match path.strip_prefix('/') {
        Some(name) if !name.is_empty() && !name.starts_with('/') => Ok(name),
        _ => Err(OperationError::bad_request(INVALID_PATH)),
    }
}
