//! Operation lookup by name and the default in-memory registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::context::OperationContext;
use crate::operation::Operation;

// ---------------------------------------------------------------------------
// OperationRegistry trait
// ---------------------------------------------------------------------------

/// Read-only view of the registered operations, as consumed by the dispatcher.
///
/// Implementations must be safe for concurrent lookup; the dispatcher calls
/// these methods from many requests at once and never mutates the registry.
pub trait OperationRegistry: Send + Sync {
    /// Looks up an operation by name.
    fn lookup(&self, name: &str) -> Option<Arc<dyn Operation>>;

    /// All registered operation names, in registration order.
    fn names(&self) -> Vec<String>;

    /// Creates the execution context for one inbound request.
    fn new_context(&self) -> OperationContext;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Errors raised while building a [`Registry`].
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("operation {name} is already registered")]
    Duplicate { name: String },
    #[error("operation name {name:?} is not a single non-empty path segment")]
    InvalidName { name: String },
}

/// In-memory operation registry.
///
/// Populated once at startup with [`Registry::register`], then shared as
/// `Arc<dyn OperationRegistry>`. Lookups are plain `HashMap` reads; the only
/// interior mutability is the atomic call-id counter behind `new_context`.
pub struct Registry {
    by_name: HashMap<String, Arc<dyn Operation>>,
    /// Registration order, used for `names()`.
    order: Vec<String>,
    next_call_id: AtomicU64,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_name: HashMap::new(),
            order: Vec::new(),
            next_call_id: AtomicU64::new(1),
        }
    }

    /// Registers an operation under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name is taken and
    /// [`RegistryError::InvalidName`] if it is empty or contains `/`.
    pub fn register<O: Operation + 'static>(&mut self, operation: O) -> Result<(), RegistryError> {
        self.register_arc(Arc::new(operation))
    }

    /// Registers an already shared operation.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::register`].
    pub fn register_arc(&mut self, operation: Arc<dyn Operation>) -> Result<(), RegistryError> {
        let name = operation.name().to_string();
        if name.is_empty() || name.contains('/') {
            return Err(RegistryError::InvalidName { name });
        }
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        debug!(
            operation = %name,
            shape = operation.request_shape().map(|s| s.type_name()),
            "registered operation"
        );
        self.by_name.insert(name.clone(), operation);
        self.order.push(name);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationRegistry for Registry {
    fn lookup(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.by_name.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn new_context(&self) -> OperationContext {
        OperationContext::new(self.next_call_id.fetch_add(1, Ordering::Relaxed))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OperationError;
    use crate::operation::operation_fn;

    fn noop(name: &'static str) -> impl Operation + 'static {
        operation_fn(name, |_ctx| async { Ok::<_, OperationError>(None::<()>) })
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = Registry::new();
        registry.register(noop("ping")).unwrap();

        let op = registry.lookup("ping");
        assert!(op.is_some());
        assert_eq!(op.unwrap().name(), "ping");
    }

    #[test]
    fn lookup_unregistered_returns_none() {
        let registry = Registry::new();
        assert!(registry.lookup("nonexistent").is_none());
    }

    #[test]
    fn names_preserve_registration_order() {
        let mut registry = Registry::new();
        registry.register(noop("zeta")).unwrap();
        registry.register(noop("alpha")).unwrap();
        registry.register(noop("mid")).unwrap();

        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = Registry::new();
        registry.register(noop("ping")).unwrap();
        let err = registry.register(noop("ping")).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { name } if name == "ping"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.register(noop("")),
            Err(RegistryError::InvalidName { .. })
        ));
        assert!(matches!(
            registry.register(noop("a/b")),
            Err(RegistryError::InvalidName { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn new_context_assigns_increasing_call_ids() {
        let registry = Registry::new();
        let first = registry.new_context();
        let second = registry.new_context();
        assert!(second.call_id > first.call_id);
    }

    #[test]
    fn registry_is_usable_as_trait_object() {
        let mut registry = Registry::new();
        registry.register(noop("ping")).unwrap();
        let shared: Arc<dyn OperationRegistry> = Arc::new(registry);
        assert!(shared.lookup("ping").is_some());
        assert_eq!(shared.names(), vec!["ping"]);
    }
}
