//! Bookstore HTTP service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (middleware) ──▶ front controller
//!                                                        │
//!                                                        ▼
//!                                              routing::Router::dispatch
//!                                         (base path strip, first match wins)
//!                                                        │
//!                                                        ▼
//!                                     Controller::from_context(&Database)
//!                                                        │
//!                                                        ▼
//!     Client Response ◀──────── http::response ◀──── action result
//!
//!     Cross-cutting: config, observability (logs + metrics), lifecycle
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use bookstore::config::{load_config, AppConfig};
use bookstore::lifecycle::{self, Shutdown};
use bookstore::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "bookstore")]
#[command(about = "Bookstore catalog HTTP service", long_about = None)]
struct Args {
    /// TOML configuration file. Environment variables (BOOKSTORE_*) override it.
    #[arg(short, long, env = "BOOKSTORE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("bookstore: invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("bookstore: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("bookstore v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        strict_templates = config.routing.strict_templates,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let bind_address = config.listener.bind_address.clone();
    let server = lifecycle::prepare(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();
    server.run(listener, shutdown.subscribe()).await?;

    Ok(())
}
