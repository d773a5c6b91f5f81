//! Handler invocation as a Tower service.
//!
//! An [`Invocation`] bundles everything one handler call needs. The innermost
//! [`HandlerService`] runs the operation and wraps any failure with the
//! operation name; layers such as [`MetricsLayer`](super::middleware::MetricsLayer)
//! wrap it without knowing anything about individual operations.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use opserve_core::{
    Operation, OperationContext, OperationError, OperationRequest, OperationResponse,
};
use tower::Service;

/// Future returned by every service in the invocation stack.
pub type InvocationFuture =
    Pin<Box<dyn Future<Output = Result<Option<OperationResponse>, OperationError>> + Send>>;

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// A resolved operation, its fresh context, and its decoded request.
pub struct Invocation {
    pub operation: Arc<dyn Operation>,
    pub ctx: OperationContext,
    pub request: Option<OperationRequest>,
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("operation", &self.operation.name())
            .field("ctx", &self.ctx)
            .field("request", &self.request)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// HandlerService
// ---------------------------------------------------------------------------

/// Innermost service: calls the operation's handler.
///
/// Handler errors are wrapped as `"<name> handler failed: ..."`; the wrapped
/// error keeps the handler's kind and status code.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlerService;

impl Service<Invocation> for HandlerService {
    type Response = Option<OperationResponse>;
    type Error = OperationError;
    type Future = InvocationFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, inv: Invocation) -> Self::Future {
        Box::pin(async move {
            let Invocation {
                operation,
                ctx,
                request,
            } = inv;
            operation
                .handle(ctx, request)
                .await
                .map_err(|e| e.context(format!("{} handler failed", operation.name())))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
