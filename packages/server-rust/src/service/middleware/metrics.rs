//! Metrics middleware for handler invocations.
//!
//! Records handler duration and outcome in a `tracing` span per call. Request
//! counters are recorded once per HTTP request by the translator instead.

use std::task::{Context, Poll};
use std::time::Instant;

use opserve_core::{OperationError, OperationResponse};
use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::service::invocation::{Invocation, InvocationFuture};

// ---------------------------------------------------------------------------
// MetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments handler invocations with timing via `tracing` spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// MetricsService
// ---------------------------------------------------------------------------

/// Service wrapper that records handler duration and outcome in tracing spans.
#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
}

impl<S> Service<Invocation> for MetricsService<S>
where
    S: Service<Invocation, Response = Option<OperationResponse>, Error = OperationError> + Send,
    S::Future: Send + 'static,
{
    type Response = Option<OperationResponse>;
    type Error = OperationError;
    type Future = InvocationFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, inv: Invocation) -> Self::Future {
        let operation = inv.operation.name().to_string();
        let call_id = inv.ctx.call_id;

        let span = info_span!(
            "operation",
            operation = %operation,
            call_id = call_id,
            request_id = %inv.ctx.request_id,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(inv);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;

                let outcome = match &result {
                    Ok(Some(_)) => "ok",
                    Ok(None) => "empty",
                    Err(_) => "error",
                };

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = start.elapsed().as_millis() as u64;
                tracing::Span::current().record("duration_ms", duration_ms);
                tracing::Span::current().record("outcome", outcome);

                tracing::debug!(
                    operation = %operation,
                    call_id = call_id,
                    duration_ms = duration_ms,
                    outcome = outcome,
                    "operation complete"
                );

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
