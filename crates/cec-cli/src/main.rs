//! cec - Main Entry Point

use anyhow::Result;
use cec_cli::Cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "starting cec");

    let output = cec_cli::run(cli)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
