//! HTTP handler definitions for the `opserve` server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports the handler functions used to build the router.

pub mod dispatch;

pub use dispatch::dispatch_handler;

use crate::service::Dispatcher;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc`-backed handles only, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Routes requests to registered operations.
    pub dispatcher: Dispatcher,
}
