//! The dispatch pipeline: path → lookup → decode/validate → handle → encode.
//!
//! [`Dispatcher::dispatch`] runs every stage and returns the first error
//! unchanged; turning that error into an HTTP response is the translator's job
//! and happens exactly once, in [`crate::service::translate::respond`].

use std::error::Error as StdError;
use std::sync::Arc;

use axum::body::Body;
use http_body_util::LengthLimitError;
use opserve_core::{OperationError, OperationRegistry};
use tower::{Layer, ServiceExt};

use super::invocation::{HandlerService, Invocation};
use super::middleware::MetricsLayer;
use super::path::operation_name;

/// Routes one request to one registered operation.
///
/// Holds only a shared handle to the read-only registry, so clones are cheap
/// and concurrent dispatches share nothing mutable.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<dyn OperationRegistry>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: Arc<dyn OperationRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<dyn OperationRegistry> {
        &self.registry
    }

    /// Runs the pipeline for one request.
    ///
    /// Returns the JSON-encoded response body, or `None` when the handler had
    /// nothing to return. The body stream is only read for operations that
    /// declare a request shape.
    ///
    /// # Errors
    ///
    /// - `BadRequest` for a malformed path, an unreadable or malformed body, or
    ///   a request rejected by validation.
    /// - `NotFound` for an unknown operation; the message lists every
    ///   registered name.
    /// - The handler's own error, wrapped with `"<name> handler failed"`.
    /// - `Encoding` if the response cannot be serialized.
    pub async fn dispatch(
        &self,
        path: &str,
        request_id: Option<&str>,
        body: Body,
    ) -> Result<Option<Vec<u8>>, OperationError> {
        let name = operation_name(path)?;

        let operation = self.registry.lookup(name).ok_or_else(|| {
            OperationError::not_found(format!(
                "unknown operation {name} != {}",
                self.registry.names().join("|")
            ))
        })?;

        let request = match operation.request_shape() {
            Some(shape) => {
                let bytes = axum::body::to_bytes(body, usize::MAX)
                    .await
                    .map_err(body_read_error)?;
                Some(shape.decode(&bytes)?)
            }
            None => None,
        };

        let mut ctx = self.registry.new_context();
        if let Some(id) = request_id {
            ctx = ctx.with_request_id(id);
        }

        let invocation = Invocation {
            operation,
            ctx,
            request,
        };
        let response = MetricsLayer
            .layer(HandlerService)
            .oneshot(invocation)
            .await?;

        response.map(|r| r.to_json()).transpose()
    }
}

/// Bodies without a `Content-Length` pass the transport's size check and only
/// hit the limit while streaming, so that case is mapped back to `413` here.
fn body_read_error(err: axum::Error) -> OperationError {
    let over_limit = std::iter::successors(Some(&err as &dyn StdError), |&e| e.source())
        .any(|e| e.is::<LengthLimitError>());
    let wrapped = OperationError::bad_request(format!("failed to read request body: {err}"));
    let wrapped = if over_limit {
        wrapped.with_status(413)
    } else {
        wrapped
    };
    wrapped.with_source(err)
}
