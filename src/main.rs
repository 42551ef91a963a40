//! reqstate - command-line client for the dashboard backend.

use clap::Parser;
use reqstate::cli::Cli;
use reqstate::{App, Config, Result, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.clone())?;

    // Keep the guard alive so file logs are flushed on exit
    let _log_guard = logging::init(&config.logging)?;

    let app = App::new(config)?.watch(cli.watch);
    app.run(cli.command).await
}
