//! Edge risk gate (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                    RISK GATE                     │
//!   Edge event / HTTP    │  ┌─────────┐   ┌─────────┐   ┌──────────────┐    │
//!   ─────────────────────┼─▶│  edge / │──▶│ routing │──▶│  assessment  │────┼──▶ Risk
//!                        │  │  http   │   │ + pages │   │ context+call │◀───┼─── backend
//!                        │  └─────────┘   └─────────┘   └──────┬───────┘    │
//!                        │                                     ▼            │
//!   Edge response        │  ┌─────────┐              ┌──────────────┐       │
//!   ◀────────────────────┼──│response │◀─────────────│   decision   │       │
//!                        │  └─────────┘              └──────────────┘       │
//!                        └──────────────────────────────────────────────────┘
//! ```
//!
//! `serve` runs a local HTTP listener in front of an optional origin.
//! `invoke` handles a single viewer-request event read from a file or stdin.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use risk_gate::config::load_config;
use risk_gate::edge::{handle_event, ViewerRequestEvent};
use risk_gate::observability::{logging, metrics};
use risk_gate::{Gate, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "risk-gate")]
#[command(about = "Risk-based access gate for edge requests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the local HTTP adapter
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Handle one viewer-request event and print the result as JSON
    Invoke {
        #[arg(short, long)]
        config: PathBuf,

        /// Event file; stdin when omitted
        #[arg(short, long)]
        event: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config).await,
        Commands::Invoke { config, event } => invoke(config, event).await,
    }
}

async fn serve(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(load_config(&path)?);
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = config.policy.mode.as_str(),
        routes = config.routes.len(),
        bind_address = %config.listener.bind_address,
        "risk-gate starting"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let server = HttpServer::new(config.clone())?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn invoke(path: PathBuf, event: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&path)?;
    logging::init_logging(&config.observability);

    let raw = match event {
        Some(file) => std::fs::read_to_string(file)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let event: ViewerRequestEvent = serde_json::from_str(&raw)?;

    let gate = Gate::from_config(&config)?;
    let output = handle_event(&gate, event).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
