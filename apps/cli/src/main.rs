//! Mushaf CLI — scripture corpus builder.
//!
//! Reads local translation sources, scrapes pronunciation pages, downloads
//! recitation audio, and assembles a single JSON corpus artifact.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
