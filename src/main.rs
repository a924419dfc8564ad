//! forward-gateway binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                   FORWARD GATEWAY                    │
//!                  │                                                      │
//!   Client Request │  ┌──────────┐   ┌──────────┐   ┌───────────────┐     │
//!   ───────────────┼─▶│  axum    │──▶│ target   │──▶│ header + body │     │
//!                  │  │  router  │   │ resolver │   │  adaptation   │     │
//!                  │  └──────────┘   └──────────┘   └───────┬───────┘     │
//!                  │                                        ▼             │
//!   Client Response│  ┌──────────┐   ┌──────────┐   ┌───────────────┐     │
//!   ◀──────────────┼──│ response │◀──│  error   │◀──│   forwarder   │◀────┼── Upstream
//!                  │  │ headers  │   │  mapper  │   │ (no redirects)│     │
//!                  │  └──────────┘   └──────────┘   └───────────────┘     │
//!                  └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use forward_gateway::config::load_config;
use forward_gateway::lifecycle::signals::spawn_signal_listener;
use forward_gateway::observability::{logging, metrics};
use forward_gateway::{GatewayServer, Shutdown};

#[derive(Parser)]
#[command(name = "forward-gateway")]
#[command(about = "Forward requests under a path prefix to a single upstream origin", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_tracing(&config.observability);

    tracing::info!("forward-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        path_prefix = %config.upstream.path_prefix,
        base_origin = config.upstream.base_origin.as_deref().unwrap_or("<unset>"),
        request_timeout_secs = config.timeouts.request_secs,
        max_body_size = ?config.limits.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    spawn_signal_listener(shutdown);

    let server = GatewayServer::new(config)?;
    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
