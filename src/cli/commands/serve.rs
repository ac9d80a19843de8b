//! `serve`: run the HTTP API.

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use crate::adapters::http::{AppState, HttpConfig, HttpServer};
use crate::adapters::sqlite::initialize_database;
use crate::application::ServiceContext;
use crate::domain::models::Config;

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// SQLite database file (overrides database.path)
    #[arg(long)]
    pub db_path: Option<String>,

    /// Keep all state in memory; nothing survives a restart
    #[arg(long, conflicts_with = "db_path")]
    pub in_memory: bool,
}

impl ServeArgs {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref path) = self.db_path {
            config.database.path = path.clone();
        }
        config
    }
}

pub async fn execute(args: ServeArgs, config: Config) -> Result<()> {
    let config = args.apply(config);

    let context = if args.in_memory {
        ServiceContext::in_memory(&config.assignment)
    } else {
        info!(path = %config.database.path, "opening database");
        let pool = initialize_database(&config.database)
            .await
            .context("Failed to initialize database")?;
        ServiceContext::sqlite(pool, &config.assignment)
    };

    let server = HttpServer::new(AppState::from(context), HttpConfig::from(&config.server));
    server.serve_with_shutdown(shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "failed to listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
