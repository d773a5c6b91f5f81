//! Operation dispatch pipeline.
//!
//! Each inbound request flows through these stages, any of which may fail
//! straight to the translator:
//!
//! 1. **Path** (`path`): `/<name>` -> operation name
//! 2. **Dispatch** (`dispatcher`): registry lookup, body decode and validation
//! 3. **Invocation** (`invocation`, `middleware`): handler call as a Tower service
//! 4. **Translation** (`translate`): outcome -> HTTP status, headers, body

pub mod dispatcher;
pub mod invocation;
pub mod middleware;
pub mod path;
pub mod translate;

pub use dispatcher::Dispatcher;
pub use invocation::{HandlerService, Invocation};
pub use middleware::MetricsLayer;
pub use path::operation_name;
pub use translate::{resolve_status, respond};
