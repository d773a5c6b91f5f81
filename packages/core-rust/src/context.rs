//! Per-request execution context.

use std::time::Instant;

/// Per-request execution context handed to an operation handler.
/// Created fresh for every inbound request by the registry's context factory.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Monotonic call number assigned by the context factory.
    pub call_id: u64,
    /// Correlation identifier, taken from the `x-request-id` header when present.
    pub request_id: String,
    /// When the context was created.
    pub received_at: Instant,
}

impl OperationContext {
    #[must_use]
    pub fn new(call_id: u64) -> Self {
        Self {
            call_id,
            request_id: uuid::Uuid::new_v4().to_string(),
            received_at: Instant::now(),
        }
    }

    /// Replaces the generated request id with one supplied by the transport.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }
}
