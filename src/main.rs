//! File gateway entry point.
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 FILE GATEWAY                 │
//!   POST /compress       │  ┌────────┐   ┌──────────┐   ┌───────────┐   │
//!   POST /imgCompressor ─┼─▶│ ingest │──▶│ dispatch │──▶│ validate  │───┼──▶ client
//!   POST /split          │  └───┬────┘   └────┬─────┘   └─────┬─────┘   │
//!   POST /merge          │      │             │ X-Password    │         │
//!                        │      ▼             ▼               ▼         │
//!                        │  ┌──────────────────────────────────────┐    │
//!                        │  │     error normalizer {"error": ..}   │    │
//!                        │  └──────────────────────────────────────┘    │
//!                        └──────────────────────│───────────────────────┘
//!                                               ▼
//!                                    file-processing backend
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use file_gateway::config::{load_config, Overrides};
use file_gateway::http::HttpServer;
use file_gateway::lifecycle::Shutdown;
use file_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "file-gateway")]
#[command(about = "Forwards PDF and image uploads to the file-processing backend", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults apply without one.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listening port, replacing the port of `listener.bind_address`.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Backend base URL, replacing `backend.base_url`.
    #[arg(long, env = "GATEWAY_BACKEND_URL")]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        port: cli.port,
        backend_url: cli.backend_url,
    };
    let config = load_config(cli.config.as_deref(), &overrides)?;

    logging::init_logging(&config.observability);
    tracing::info!("file-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.base_url,
        max_concurrency = config.listener.max_concurrency,
        backend_timeout_secs = config.timeouts.backend_secs,
        merge_timeout_secs = config.timeouts.merge_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address already checked by config validation.
        let addr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to install metrics recorder");
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
