mod cli;
mod commands;
mod config;
mod error;
mod fetch;
mod logging;
mod server;
mod service;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("superpose v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    match cli.command {
        Commands::Align(args) => commands::align::run(args).await,
        Commands::Serve(args) => commands::serve::run(args).await,
    }
}
