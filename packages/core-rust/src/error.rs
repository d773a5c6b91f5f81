//! Structured operation errors.
//!
//! Every failure in the dispatch pipeline is an [`OperationError`]: a kind, a
//! human-readable message, and an optional HTTP status code. Wrapping an error
//! with [`OperationError::context`] prefixes the message but keeps the kind and
//! the embedded status, so a handler's `409` survives all the way to the wire.

use std::error::Error as StdError;
use std::fmt;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Category of a dispatch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed path, malformed body, or failed validation.
    BadRequest,
    /// The named operation is not registered.
    NotFound,
    /// Failure reported by operation logic.
    Handler,
    /// The response value could not be serialized.
    Encoding,
}

impl ErrorKind {
    /// Returns a stable lowercase label for logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::Handler => "handler",
            Self::Encoding => "encoding",
        }
    }
}

/// Error value carrying a message and an optional machine-readable status code.
#[derive(thiserror::Error)]
#[error("{message}")]
pub struct OperationError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
    #[source]
    source: Option<BoxError>,
}

impl OperationError {
    /// Creates an error of the given kind without a status code.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// `400 Bad Request`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message).with_status(400)
    }

    /// `404 Not Found`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message).with_status(404)
    }

    /// Handler failure with no status; the dispatcher answers 500.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Handler, message)
    }

    /// Handler failure that asks for a specific HTTP status.
    pub fn with_code(status: u16, message: impl Into<String>) -> Self {
        Self::handler(message).with_status(status)
    }

    /// Response serialization failure.
    pub fn encoding(source: serde_json::Error) -> Self {
        Self {
            kind: ErrorKind::Encoding,
            message: format!("failed to encode response: {source}"),
            status: None,
            source: Some(Box::new(source)),
        }
    }

    /// Sets the embedded status code.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches an underlying cause, kept for diagnostics only.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Wraps this error with a context message.
    ///
    /// The result reads `"<context>: <message>"`, keeps this error's kind and
    /// status, and records this error as its source.
    #[must_use]
    pub fn context(self, context: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{context}: {}", self.message),
            status: self.status,
            source: Some(Box::new(self)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The embedded status code, if any. Not guaranteed to be a valid HTTP status.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("OperationError");
        s.field("kind", &self.kind)
            .field("message", &self.message)
            .field("status", &self.status);
        if let Some(source) = &self.source {
            s.field("source", source);
        }
        s.finish()
    }
}

impl From<anyhow::Error> for OperationError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::Handler,
            message: format!("{err:#}"),
            status: None,
            source: Some(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn bad_request_carries_400() {
        let err = OperationError::bad_request("nope");
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn handler_error_has_no_status() {
        let err = OperationError::handler("boom");
        assert_eq!(err.kind(), ErrorKind::Handler);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn context_preserves_status_and_kind() {
        let err = OperationError::with_code(409, "already exists").context("create handler failed");
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.kind(), ErrorKind::Handler);
        assert_eq!(err.to_string(), "create handler failed: already exists");
    }

    #[test]
    fn context_records_original_as_source() {
        let err = OperationError::not_found("missing").context("outer");
        let source = err.source().expect("source should be set");
        assert_eq!(source.to_string(), "missing");
    }

    #[test]
    fn anyhow_conversion_keeps_chain_text() {
        let inner = anyhow::anyhow!("disk full").context("write failed");
        let err = OperationError::from(inner);
        assert_eq!(err.kind(), ErrorKind::Handler);
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "write failed: disk full");
    }

    #[test]
    fn encoding_error_mentions_cause() {
        let json_err = serde_json::from_str::<u32>("x").unwrap_err();
        let err = OperationError::encoding(json_err);
        assert_eq!(err.kind(), ErrorKind::Encoding);
        assert!(err.to_string().starts_with("failed to encode response:"));
        assert!(err.status().is_none());
    }

    #[test]
    fn debug_output_includes_source() {
        let err = OperationError::handler("inner").context("outer");
        let debug = format!("{err:?}");
        assert!(debug.contains("outer: inner"));
        assert!(debug.contains("source"));
    }
}
