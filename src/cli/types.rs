//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::{loadtest::LoadtestArgs, seed::SeedArgs, serve::ServeArgs, stats::StatsArgs};

#[derive(Parser, Debug)]
#[command(name = "reviewer-assign")]
#[command(about = "Pull request reviewer assignment service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Read configuration from this file instead of .reviewer/
    #[arg(short, long, global = true, env = "REVIEWER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Create demo teams and users through a running server
    Seed(SeedArgs),

    /// Create and merge pull requests at a fixed rate against a running server
    Loadtest(LoadtestArgs),

    /// Show reviewer assignment counts from a running server
    Stats(StatsArgs),
}
