//! Request shapes: type-directed JSON decoding and optional validation.
//!
//! The dispatcher never sees concrete request types. Each operation instead
//! registers a [`RequestShape`], which carries the type's name and a decode
//! function monomorphized for that type. Decoding follows these rules:
//!
//! - An empty or whitespace-only body yields `T::default()`.
//! - Only the first JSON value is read; trailing bytes are ignored.
//! - Any other parse failure is a `BadRequest` naming the target type.
//! - Shapes built with [`RequestShape::validated`] run [`Validate::validate`]
//!   on the decoded value, including the default one.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::OperationError;
use crate::operation::OperationRequest;

/// Optional validation capability for request types.
pub trait Validate {
    /// Checks the decoded value.
    ///
    /// # Errors
    ///
    /// Returns a description of the first constraint the value violates.
    fn validate(&self) -> anyhow::Result<()>;
}

type DecodeFn = fn(&[u8]) -> Result<OperationRequest, OperationError>;

/// Descriptor of an operation's expected request payload.
#[derive(Clone, Copy)]
pub struct RequestShape {
    type_name: &'static str,
    validated: bool,
    decode: DecodeFn,
}

impl RequestShape {
    /// Shape for `T` without validation.
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: DeserializeOwned + Default + Send + 'static,
    {
        Self {
            type_name: std::any::type_name::<T>(),
            validated: false,
            decode: decode_plain::<T>,
        }
    }

    /// Shape for `T` that runs `T::validate` after decoding.
    #[must_use]
    pub fn validated<T>() -> Self
    where
        T: DeserializeOwned + Default + Validate + Send + 'static,
    {
        Self {
            type_name: std::any::type_name::<T>(),
            validated: true,
            decode: decode_validated::<T>,
        }
    }

    /// Fully qualified name of the request type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Decodes (and, if configured, validates) a request body.
    ///
    /// # Errors
    ///
    /// Returns a `BadRequest` error when the body is not valid JSON for the
    /// shape or when validation rejects the decoded value.
    pub fn decode(&self, body: &[u8]) -> Result<OperationRequest, OperationError> {
        (self.decode)(body)
    }
}

impl fmt::Debug for RequestShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestShape")
            .field("type_name", &self.type_name)
            .field("validated", &self.validated)
            .finish_non_exhaustive()
    }
}

fn decode_plain<T>(body: &[u8]) -> Result<OperationRequest, OperationError>
where
    T: DeserializeOwned + Default + Send + 'static,
{
    decode_value::<T>(body).map(OperationRequest::new)
}

fn decode_validated<T>(body: &[u8]) -> Result<OperationRequest, OperationError>
where
    T: DeserializeOwned + Default + Validate + Send + 'static,
{
    let value = decode_value::<T>(body)?;
    value
        .validate()
        .map_err(|e| OperationError::bad_request(format!("invalid request: {e:#}")))?;
    Ok(OperationRequest::new(value))
}

fn decode_value<T>(body: &[u8]) -> Result<T, OperationError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let mut de = serde_json::Deserializer::from_slice(body);
    T::deserialize(&mut de).map_err(|e| {
        OperationError::bad_request(format!(
            "failed to decode body into {}: {e}",
            std::any::type_name::<T>()
        ))
        .with_source(e)
    })
}
