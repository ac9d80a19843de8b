pub mod config;
pub mod pull_request;
pub mod team;
pub mod user;

pub use config::{AssignmentConfig, Config, DatabaseConfig, LoggingConfig, ServerConfig};
pub use pull_request::{
    PullRequest, PullRequestShort, PullRequestStatus, ReviewerAssignmentStat, MAX_REVIEWERS,
};
pub use team::Team;
pub use user::User;
