//! ## autobrake-cli
//! **Operational interface for the collision controller**
//!
//! Deterministic simulation, scenario replay, and a live mode fed with
//! newline-delimited JSON sensor events.

use clap::Parser;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::run_command(cli).await
}
