//! Reviewer Assign - pull request reviewer assignment service
//!
//! Assigns up to two reviewers to each new pull request from the author's
//! team, supports reassignment and merging, and reports assignment counts.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, ports and errors
//! - **Service Layer** (`services`): candidate pool, reviewer selection,
//!   the assignment engine and team onboarding
//! - **Adapters** (`adapters`): SQLite and in-memory storage, HTTP transport
//! - **Application Layer** (`application`): wiring adapters into services
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use reviewer_assign::application::ServiceContext;
//! use reviewer_assign::domain::models::{AssignmentConfig, User};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = ServiceContext::in_memory(&AssignmentConfig::default());
//!     ctx.teams
//!         .create_team_with_members("backend", vec![User::new("u1", "Alice", "backend")])
//!         .await?;
//!     let pr = ctx.assignments.create_pull_request("pr-1", "Add search", "u1").await?;
//!     println!("{:?}", pr.reviewer_ids);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::ServiceContext;
pub use domain::errors::{DomainError, DomainResult, Entity, ErrorKind};
pub use domain::models::{
    AssignmentConfig, Config, DatabaseConfig, LoggingConfig, PullRequest, PullRequestShort,
    PullRequestStatus, ReviewerAssignmentStat, ServerConfig, Team, User,
};
pub use domain::ports::{PullRequestRepository, RandomSource, TeamRepository, UserRepository};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AssignmentPolicy, AssignmentService, Reassignment, SeededRandom, TeamService};
