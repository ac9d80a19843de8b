//! User directory port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::User;

/// Read side of the user directory, plus the onboarding writes.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by ID.
    async fn get(&self, id: &str) -> DomainResult<Option<User>>;

    /// List the active members of a team.
    async fn list_active_by_team(&self, team_name: &str) -> DomainResult<Vec<User>>;

    /// Flip a user's active flag. Returns the updated user, or `None` if unknown.
    async fn set_active(&self, id: &str, is_active: bool) -> DomainResult<Option<User>>;
}
