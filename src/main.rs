//! CORS Relay
//!
//! A single-hop HTTP relay that lets browser code reach third-party URLs.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request     ┌──────────────────────────────────────────────┐
//!     ───────────────────┼─▶ http::server ──▶ relay::normalize          │
//!     (GET ?url=...      │                        │                     │
//!      or POST {json})   │                        ▼                     │
//!                        │                   TargetDescriptor           │
//!                        │                        │                     │
//!     Client Response    │                        ▼                     │
//!     ◀──────────────────┼── http::response ◀── relay::forward ◀───────┼──── Target
//!     (CORS + stream)    │                                              │     Server
//!                        │   config · observability · lifecycle         │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_relay::config::{load_config, RelayConfig};
use cors_relay::http::HttpServer;
use cors_relay::lifecycle::Shutdown;
use cors_relay::observability::init_logging;

#[derive(Parser)]
#[command(name = "cors-relay")]
#[command(about = "Single-hop HTTP relay with permissive CORS headers", long_about = None)]
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

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability)?;

    tracing::info!("cors-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        connect_timeout_secs = ?config.timeouts.connect_secs,
        propagate_status = config.relay.propagate_status,
        extra_presets = config.presets.len(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
