//! REST server with deferred startup lifecycle.
//!
//! Implements the deferred startup pattern: `new()` wires the dispatcher,
//! `start()` binds the TCP listener, and `serve()` starts accepting
//! connections. Splitting `start()` from `serve()` lets callers learn the
//! bound port (useful with port 0) before traffic begins.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use opserve_core::OperationRegistry;
use tokio::net::TcpListener;
use tracing::info;

use super::config::NetworkConfig;
use super::handlers::{dispatch_handler, AppState};
use super::middleware::build_http_layers;
use crate::service::Dispatcher;

/// Serves the registered operations at `/<operationName>`.
///
/// Follows the deferred startup pattern:
/// 1. `new()` -- builds the dispatcher around the registry
/// 2. `start()` -- binds TCP listener to the configured address
/// 3. `serve()` -- accepts connections until shutdown is signalled
pub struct RestServer {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    dispatcher: Dispatcher,
}

impl RestServer {
    /// Creates a server for `registry` without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, registry: Arc<dyn OperationRegistry>) -> Self {
        Self {
            config,
            listener: None,
            dispatcher: Dispatcher::new(registry),
        }
    }

    #[must_use]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Assembles the axum router.
    ///
    /// There are no fixed routes: every method and path goes to the
    /// dispatcher, which treats the path as an operation name.
    pub fn build_router(&self) -> Router {
        let state = AppState {
            dispatcher: self.dispatcher.clone(),
        };

        Router::new()
            .fallback(dispatch_handler)
            .layer(build_http_layers(&self.config))
            .with_state(state)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the configured
    /// port when port 0 is used (OS-assigned ephemeral port).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let listener = TcpListener::bind(self.config.addr()).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until the shutdown future resolves, then lets
    /// in-flight requests finish.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first or if the server
    /// hits a fatal I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let router = self.build_router();
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow::anyhow!("start() must be called before serve()"))?;

        info!("HTTP REST server listen on {}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("HTTP REST server stopped");
        Ok(())
    }
}
