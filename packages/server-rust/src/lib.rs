//! `opserve` server: exposes registered operations over HTTP at `/<operationName>`.

pub mod demo;
pub mod network;
pub mod service;
pub mod telemetry;

pub use network::{NetworkConfig, RestServer};
pub use service::Dispatcher;

