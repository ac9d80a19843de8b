//! reviewer-assign CLI entry point.

use anyhow::Result;
use clap::Parser;

use reviewer_assign::cli::{self, commands, Cli, Commands};
use reviewer_assign::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        cli::handle_error(err, json_mode);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli::load_config(cli.config.as_deref())?;
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
        Commands::Seed(args) => commands::seed::execute(args, cli.json).await,
        Commands::Loadtest(args) => commands::loadtest::execute(args, cli.json).await,
        Commands::Stats(args) => commands::stats::execute(args, cli.json).await,
    }
}
