//! API logger service.
//!
//! # Architecture Overview
//!
//! ```text
//!   POST /login
//!       │
//!       ▼
//!   ┌──────────┐   ┌────────────┐   ┌─────────┐   ┌──────────┐   ┌────────────┐
//!   │ client   │──▶│ rate limit │──▶│ decode  │──▶│ redact   │──▶│ enrich     │
//!   │ ip       │   │ (per IP)   │   │ ≤ 1 MiB │   │          │   │ id + time  │
//!   └──────────┘   └────────────┘   └─────────┘   └──────────┘   └─────┬──────┘
//!                                                                      │
//!                                                                      ▼
//!   response ◀──────────────────────────────────────────────── ┌──────────────┐
//!                                                              │ append-only  │
//!                                                              │ logs.jsonl   │
//!                                                              └─────┬────────┘
//!                                                                    │ queue
//!                                                                    ▼
//!                                                          ┌───────────────────┐
//!                                                          │ notify worker     │
//!                                                          │ webhook │ bot     │
//!                                                          └───────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_logger::config::{load_config, EnvVars};
use api_logger::lifecycle::signals::shutdown_on_signal;
use api_logger::observability::{logging::init_logging, metrics::init_metrics};
use api_logger::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "api-logger")]
#[command(about = "Logs login metadata to a JSON Lines file and notifies chat webhooks")]
struct Args {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Env file layered over the process environment
    #[arg(short, long, default_value = ".env")]
    env_file: PathBuf,

    /// Bind address, overrides config and environment
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let env = EnvVars::from_process_and_file(&args.env_file)?;
    let mut config = load_config(args.config.as_deref(), &env)?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!("api-logger v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
