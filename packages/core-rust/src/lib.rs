//! `opserve` core: operation descriptors, request shapes, the operation registry,
//! and the structured error type shared by the dispatcher and operation authors.

pub mod context;
pub mod error;
pub mod operation;
pub mod registry;
pub mod shape;

pub use context::OperationContext;
pub use error::{ErrorKind, OperationError};
pub use operation::{
    operation_fn, operation_validated, operation_with, FnOperation, Operation, OperationRequest,
    OperationResponse, TypedOperation,
};
pub use registry::{OperationRegistry, Registry, RegistryError};
pub use shape::{RequestShape, Validate};
