//! # Tracker CLI Entry Point
//!
//! Headless host for the refresh and sync orchestration layer.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          tracker (binary)                               │
//! │                                                                         │
//! │  main.rs ─────► logging, argument parsing, exit code                   │
//! │  app.rs ──────► config, database, coordinator wiring                   │
//! │  commands.rs ─► add / list / refresh / sync / watch / status           │
//! │  mirror.rs ───► second SQLite file as remote store + live analytics    │
//! │  console.rs ──► toasts to stdout                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr, so JSON output stays clean)
//! 2. Parse arguments
//! 3. Load `tracker.toml` and environment overrides
//! 4. Open the local database and run migrations
//! 5. Run the subcommand

mod app;
mod args;
mod commands;
mod console;
mod error;
mod mirror;

use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::args::Cli;
use crate::error::CliResult;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    let result: CliResult<()> = async move {
        let app = App::open(cli.config, cli.db).await?;
        let outcome = commands::dispatch(&app, cli.command).await;
        app.db.close().await;
        outcome
    }
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tracker=trace` - Trace for tracker crates only
/// - Default: warnings, plus info from tracker crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,tracker=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
