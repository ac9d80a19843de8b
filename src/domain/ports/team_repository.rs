//! Team repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Team, User};

/// Repository interface for team onboarding.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Check whether a team with this name exists.
    async fn exists(&self, name: &str) -> DomainResult<bool>;

    /// Get a team by name.
    async fn get(&self, name: &str) -> DomainResult<Option<Team>>;

    /// Create a new team. Fails with `AlreadyExists` on a name collision.
    async fn create(&self, team: &Team) -> DomainResult<()>;

    /// Insert or update members, moving them into `team_name`.
    async fn upsert_members(&self, team_name: &str, members: &[User]) -> DomainResult<()>;

    /// List every member of a team, active or not, ordered by user ID.
    async fn list_members(&self, team_name: &str) -> DomainResult<Vec<User>>;
}
