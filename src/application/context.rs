use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use crate::adapters::memory::{InMemoryDirectory, InMemoryPullRequestStore};
use crate::adapters::sqlite::{SqlitePullRequestRepository, SqliteTeamRepository, SqliteUserRepository};
use crate::domain::models::AssignmentConfig;
use crate::domain::ports::{PullRequestRepository, RandomSource, TeamRepository, UserRepository};
use crate::services::{AssignmentPolicy, AssignmentService, SeededRandom, TeamService};

/// The assignment engine and directory services over one set of adapters.
#[derive(Clone)]
pub struct ServiceContext {
    pub assignments: Arc<AssignmentService>,
    pub teams: Arc<TeamService>,
}

impl ServiceContext {
    pub fn from_repositories(
        users: Arc<dyn UserRepository>,
        teams: Arc<dyn TeamRepository>,
        pull_requests: Arc<dyn PullRequestRepository>,
        rng: Arc<dyn RandomSource>,
        policy: AssignmentPolicy,
    ) -> Self {
        let assignments =
            AssignmentService::new(users.clone(), pull_requests.clone(), rng).with_policy(policy);
        let teams = TeamService::new(teams, users, pull_requests);
        Self {
            assignments: Arc::new(assignments),
            teams: Arc::new(teams),
        }
    }

    /// Services backed by a migrated SQLite pool.
    pub fn sqlite(pool: SqlitePool, config: &AssignmentConfig) -> Self {
        info!(seeded = config.seed.is_some(), "using SQLite storage");
        Self::from_repositories(
            Arc::new(SqliteUserRepository::new(pool.clone())),
            Arc::new(SqliteTeamRepository::new(pool.clone())),
            Arc::new(SqlitePullRequestRepository::new(pool)),
            Arc::new(SeededRandom::from_optional_seed(config.seed)),
            AssignmentPolicy::from(config),
        )
    }

    /// Services backed by process memory; state is lost on exit.
    pub fn in_memory(config: &AssignmentConfig) -> Self {
        info!(seeded = config.seed.is_some(), "using in-memory storage");
        let directory = Arc::new(InMemoryDirectory::new());
        Self::from_repositories(
            directory.clone(),
            directory,
            Arc::new(InMemoryPullRequestStore::new()),
            Arc::new(SeededRandom::from_optional_seed(config.seed)),
            AssignmentPolicy::from(config),
        )
    }
}
