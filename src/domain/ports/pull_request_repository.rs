//! Pull request (work-item) store port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{PullRequest, PullRequestShort, ReviewerAssignmentStat};

/// Repository interface for pull request persistence.
///
/// `create` and `update` must be atomic: a failed call leaves the stored
/// record untouched.
#[async_trait]
pub trait PullRequestRepository: Send + Sync {
    /// Check whether a pull request with this ID exists.
    async fn exists(&self, id: &str) -> DomainResult<bool>;

    /// Create a new pull request. Fails with `AlreadyExists` on an ID collision.
    async fn create(&self, pr: &PullRequest) -> DomainResult<()>;

    /// Get a pull request by ID.
    async fn get(&self, id: &str) -> DomainResult<Option<PullRequest>>;

    /// Persist a modified pull request.
    ///
    /// Succeeds only if the stored version equals `pr.version`; the stored
    /// version is then incremented. Returns the new version.
    async fn update(&self, pr: &PullRequest) -> DomainResult<u64>;

    /// List pull requests the user is currently assigned to review.
    async fn list_by_reviewer(&self, user_id: &str) -> DomainResult<Vec<PullRequestShort>>;

    /// Count reviewer assignments per user, ordered by user ID.
    async fn reviewer_assignment_stats(&self) -> DomainResult<Vec<ReviewerAssignmentStat>>;
}
