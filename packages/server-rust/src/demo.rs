//! Demo operations served by the `opserve` binary.

use opserve_core::{
    operation_fn, operation_validated, operation_with, OperationContext, OperationError,
    Registry, RegistryError, Validate,
};
use serde::{Deserialize, Serialize};

/// Request body for `create`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub name: String,
}

impl Validate for CreateRequest {
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.name.trim().is_empty(), "name must not be empty");
        anyhow::ensure!(self.name.len() <= 64, "name longer than 64 bytes");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: u64,
    pub name: String,
}

/// Builds a registry with `ping`, `echo`, and `create`.
///
/// # Errors
///
/// Only fails if two demo operations share a name.
pub fn demo_registry() -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();

    registry.register(operation_fn("ping", |_ctx| async {
        Ok::<_, OperationError>(Some(serde_json::json!({ "ok": true })))
    }))?;

    // Null body decodes to `Value::Null`, which is echoed as `null`.
    registry.register(operation_with("echo", |_ctx, value: serde_json::Value| async move {
        Ok::<_, OperationError>(Some(value))
    }))?;

    registry.register(operation_validated(
        "create",
        |ctx: OperationContext, req: CreateRequest| async move {
            Ok::<_, OperationError>(Some(Created {
                id: ctx.call_id,
                name: req.name,
            }))
        },
    ))?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use opserve_core::OperationRegistry;

    use super::*;

    #[test]
    fn demo_registry_lists_operations_in_order() {
        let registry = demo_registry().unwrap();
        assert_eq!(registry.names(), vec!["ping", "echo", "create"]);
    }

    #[test]
    fn create_request_validation() {
        assert!(CreateRequest::default().validate().is_err());
        assert!(CreateRequest { name: "  ".into() }.validate().is_err());
        assert!(CreateRequest { name: "x".repeat(65) }.validate().is_err());
        assert!(CreateRequest { name: "widget".into() }.validate().is_ok());
    }

    #[test]
    fn echo_and_create_declare_shapes() {
        let registry = demo_registry().unwrap();
        assert!(registry.lookup("ping").unwrap().request_shape().is_none());
        assert!(registry.lookup("echo").unwrap().request_shape().is_some());
        let create = registry.lookup("create").unwrap();
        assert!(create.request_shape().unwrap().is_validated());
    }
}
