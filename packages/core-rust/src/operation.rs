//! Operation descriptors and the type-erased values that flow through them.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::OperationContext;
use crate::error::OperationError;
use crate::shape::{RequestShape, Validate};

// ---------------------------------------------------------------------------
// Request / Response values
// ---------------------------------------------------------------------------

/// Decoded request value of whatever type the operation's shape declares.
pub struct OperationRequest(Box<dyn Any + Send>);

impl OperationRequest {
    pub fn new<T: Send + 'static>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Recovers the concrete request type.
    ///
    /// # Errors
    ///
    /// Returns a `Handler` error (no status, so a 500) if the value is not a `T`.
    pub fn downcast<T: 'static>(self) -> Result<T, OperationError> {
        self.0.downcast::<T>().map(|b| *b).map_err(|_| {
            OperationError::handler(format!(
                "request is not a {}",
                std::any::type_name::<T>()
            ))
        })
    }
}

impl fmt::Debug for OperationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OperationRequest(..)")
    }
}

trait JsonEncode: Send {
    fn encode(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T: Serialize + Send> JsonEncode for T {
    fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Response value returned by a handler; serialized to JSON by the dispatcher.
pub struct OperationResponse(Box<dyn JsonEncode>);

impl OperationResponse {
    pub fn new<T: Serialize + Send + 'static>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Serializes the response body.
    ///
    /// # Errors
    ///
    /// Returns an `Encoding` error if the value cannot be represented as JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, OperationError> {
        self.0.encode().map_err(OperationError::encoding)
    }
}

impl fmt::Debug for OperationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OperationResponse(..)")
    }
}

// ---------------------------------------------------------------------------
// Operation trait
// ---------------------------------------------------------------------------

/// A named unit of business logic reachable at `/<name>`.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Unique operation name; also the URL path segment.
    fn name(&self) -> &str;

    /// Shape of the request payload, or `None` if the operation takes no body.
    fn request_shape(&self) -> Option<&RequestShape>;

    /// Runs the operation.
    ///
    /// `request` is `Some` exactly when [`Operation::request_shape`] is `Some`.
    /// `Ok(None)` means the operation has nothing to return.
    async fn handle(
        &self,
        ctx: OperationContext,
        request: Option<OperationRequest>,
    ) -> Result<Option<OperationResponse>, OperationError>;
}

// ---------------------------------------------------------------------------
// Closure adapters
// ---------------------------------------------------------------------------

/// Operation built from an async closure that takes no request payload.
pub struct FnOperation<F> {
    name: String,
    handler: F,
}

/// Builds an operation without a request payload.
pub fn operation_fn<F, Fut, R>(name: impl Into<String>, handler: F) -> FnOperation<F>
where
    F: Fn(OperationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<R>, OperationError>> + Send + 'static,
    R: Serialize + Send + 'static,
{
    FnOperation {
        name: name.into(),
        handler,
    }
}

#[async_trait]
impl<F, Fut, R> Operation for FnOperation<F>
where
    F: Fn(OperationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<R>, OperationError>> + Send + 'static,
    R: Serialize + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn request_shape(&self) -> Option<&RequestShape> {
        None
    }

    async fn handle(
        &self,
        ctx: OperationContext,
        _request: Option<OperationRequest>,
    ) -> Result<Option<OperationResponse>, OperationError> {
        Ok((self.handler)(ctx).await?.map(OperationResponse::new))
    }
}

/// Operation built from an async closure that takes a typed request `T`.
pub struct TypedOperation<T, F> {
    name: String,
    shape: RequestShape,
    handler: F,
    _request: PhantomData<fn(T)>,
}

/// Builds an operation whose body decodes into `T` without validation.
pub fn operation_with<T, F, Fut, R>(name: impl Into<String>, handler: F) -> TypedOperation<T, F>
where
    T: DeserializeOwned + Default + Send + 'static,
    F: Fn(OperationContext, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<R>, OperationError>> + Send + 'static,
    R: Serialize + Send + 'static,
{
    TypedOperation {
        name: name.into(),
        shape: RequestShape::of::<T>(),
        handler,
        _request: PhantomData,
    }
}

/// Builds an operation whose body decodes into `T` and is checked with
/// [`Validate::validate`] before the handler runs.
pub fn operation_validated<T, F, Fut, R>(
    name: impl Into<String>,
    handler: F,
) -> TypedOperation<T, F>
where
    T: DeserializeOwned + Default + Validate + Send + 'static,
    F: Fn(OperationContext, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<R>, OperationError>> + Send + 'static,
    R: Serialize + Send + 'static,
{
    TypedOperation {
        name: name.into(),
        shape: RequestShape::validated::<T>(),
        handler,
        _request: PhantomData,
    }
}

#[async_trait]
impl<T, F, Fut, R> Operation for TypedOperation<T, F>
where
    T: Send + 'static,
    F: Fn(OperationContext, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<R>, OperationError>> + Send + 'static,
    R: Serialize + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn request_shape(&self) -> Option<&RequestShape> {
        Some(&self.shape)
    }

    async fn handle(
        &self,
        ctx: OperationContext,
        request: Option<OperationRequest>,
    ) -> Result<Option<OperationResponse>, OperationError> {
        let request = request
            .ok_or_else(|| OperationError::handler(format!("{} requires a request", self.name)))?
            .downcast::<T>()?;
        Ok((self.handler)(ctx, request).await?.map(OperationResponse::new))
    }
}
