//! Tower middleware layers wrapped around handler invocation.

pub mod metrics;

pub use metrics::{MetricsLayer, MetricsService};
