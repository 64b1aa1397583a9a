//! snowgate - ServiceNow change-request adapter
//!
//! Runs one adapter operation against the configured instance and prints
//! the result to stdout. Logs go to stderr.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `SNOW_URL`: Instance URL
//! - `SNOW_USERNAME` / `SNOW_PASSWORD`: Basic-auth credentials
//! - `SNOW_TABLE`: Table name (optional, default `change_request`)
//!
//! # Usage
//!
//! ```bash
//! # Health check, prints ONLINE or OFFLINE
//! ./snowgate
//!
//! # Read change requests as normalized tickets
//! ./snowgate get
//!
//! # Create a change request
//! ./snowgate post
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use snowgate::{Adapter, AdapterConfig, AdapterStatus};

#[derive(Parser, Debug)]
#[command(name = "snowgate", version, about = "ServiceNow change-request adapter")]
struct Cli {
    /// Identifier included in status events.
    #[arg(long, env = "SNOW_ADAPTER_ID", default_value = "snowgate")]
    id: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Run one health check and print the emitted status.
    Health,
    /// Read the table and print the normalized tickets.
    Get,
    /// Create a record and print it as a normalized ticket.
    Post,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snowgate=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting snowgate v{}", env!("CARGO_PKG_VERSION"));

    let config = AdapterConfig::from_env().context("Failed to load configuration")?;

    tracing::debug!(url = %config.url, table = %config.table, "Configuration loaded");

    let adapter = Adapter::new(cli.id, &config).context("Failed to create adapter")?;

    match cli.command.unwrap_or(Command::Health) {
        Command::Health => {
            let mut events = adapter.subscribe();
            adapter.connect().await;
            let event = events
                .recv()
                .await
                .context("Health check finished without a status event")?;
            println!("{} {}", event.status, event.id());
            if event.status == AdapterStatus::Offline {
                std::process::exit(1);
            }
        }
        Command::Get => {
            let tickets = adapter
                .get_record()
                .await
                .context("Failed to read records")?;
            println!("{}", tickets);
        }
        Command::Post => {
            let ticket = adapter
                .post_record()
                .await
                .context("Failed to create record")?;
            println!(
                "{}",
                serde_json::to_string(&ticket).context("Failed to serialize ticket")?
            );
        }
    }

    Ok(())
}
