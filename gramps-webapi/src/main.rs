//! gramps-webapi - REST API in front of a Gramps family tree.
//!
//! Architecture:
//! - `serve` loads a TOML config (path from GRAMPS_API_CONFIG) once at startup
//! - Each request opens the configured tree lazily and closes it when done
//! - Trees are SQLite databases in the Gramps database directory layout

mod cli;
mod config;
mod db;
mod error;
mod models;
mod server;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{execute, Cli};

/// Initialize console logging. `RUST_LOG` overrides the default level.
fn init_tracing(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;
    execute(cli).await
}
