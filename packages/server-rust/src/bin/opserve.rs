//! `opserve` -- serves the demo operations over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use opserve_core::OperationRegistry;
use opserve_server::demo::demo_registry;
use opserve_server::telemetry::{init_metrics, init_tracing, LogFormat};
use opserve_server::{NetworkConfig, RestServer};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "opserve", version, about = "Serve registered operations over HTTP")]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "OPSERVE_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "OPSERVE_PORT", default_value_t = 8080)]
    port: u16,

    /// Seconds before an in-flight request is answered with 408.
    #[arg(long, env = "OPSERVE_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    /// Largest accepted request body, in bytes.
    #[arg(long, env = "OPSERVE_MAX_BODY_BYTES", default_value_t = 2 * 1024 * 1024)]
    max_body_bytes: usize,

    /// Expose Prometheus metrics on this port.
    #[arg(long, env = "OPSERVE_METRICS_PORT")]
    metrics_port: Option<u16>,

    /// Log line format.
    #[arg(long, env = "OPSERVE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Cli {
    fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let config = cli.network_config();
    config.validate()?;

    if let Some(port) = cli.metrics_port {
        let addr: SocketAddr = format!("{}:{port}", cli.host).parse()?;
        init_metrics(addr)?;
        info!("Prometheus metrics on {addr}");
    }

    let registry = demo_registry()?;
    info!(operations = ?registry.names(), "registered operations");

    let mut server = RestServer::new(config, Arc::new(registry));
    server.start().await?;
    server.serve(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
