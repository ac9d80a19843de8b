//! Reviewer assignment engine.
//!
//! Implements the three pull request commands (create with initial review
//! assignment, reassign one reviewer, merge) on top of the user directory
//! and the pull request store.
//!
//! The engine holds no state besides the shared random source. Each command
//! is a read-then-write against the store; lost updates between concurrent
//! commands on one pull request are rejected by the store's version check
//! and surface as `ConcurrencyConflict`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult, Entity};
use crate::domain::models::{AssignmentConfig, PullRequest, MAX_REVIEWERS};
use crate::domain::ports::{PullRequestRepository, RandomSource, UserRepository};
use crate::services::candidate_pool::build_pool;
use crate::services::reviewer_selector::ReviewerSelector;

/// Knobs that change who may be picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentPolicy {
    /// Add the PR author to the reassignment exclusion set.
    pub exclude_author_on_reassign: bool,
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self {
            exclude_author_on_reassign: true,
        }
    }
}

impl From<&AssignmentConfig> for AssignmentPolicy {
    fn from(config: &AssignmentConfig) -> Self {
        Self {
            exclude_author_on_reassign: config.exclude_author_on_reassign,
        }
    }
}

/// Result of a successful reassignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub pull_request: PullRequest,
    pub replaced_by: String,
}

pub struct AssignmentService {
    users: Arc<dyn UserRepository>,
    pull_requests: Arc<dyn PullRequestRepository>,
    selector: ReviewerSelector,
    policy: AssignmentPolicy,
}

impl AssignmentService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        pull_requests: Arc<dyn PullRequestRepository>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            users,
            pull_requests,
            selector: ReviewerSelector::new(rng),
            policy: AssignmentPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AssignmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> AssignmentPolicy {
        self.policy
    }

    /// Create an open pull request and assign up to two reviewers from the
    /// author's team.
    ///
    /// Fewer than two reviewers (including none) is a valid outcome when the
    /// team is small.
    #[instrument(skip_all, fields(pr_id = %id, author_id = %author_id))]
    pub async fn create_pull_request(
        &self,
        id: &str,
        title: &str,
        author_id: &str,
    ) -> DomainResult<PullRequest> {
        if self.pull_requests.exists(id).await? {
            return Err(DomainError::already_exists(Entity::PullRequest, id));
        }

        let author = self
            .users
            .get(author_id)
            .await?
            .ok_or_else(|| DomainError::not_found(Entity::User, author_id))?;

        if !author.is_active {
            return Err(DomainError::AuthorInactive(author.id));
        }

        let members = self.users.list_active_by_team(&author.team_name).await?;
        let exclude: HashSet<&str> = [author.id.as_str()].into_iter().collect();
        let pool = build_pool(&members, &exclude);
        let reviewers = self.selector.shuffle_select(pool, MAX_REVIEWERS);

        if reviewers.len() < MAX_REVIEWERS {
            debug!(
                team = %author.team_name,
                assigned = reviewers.len(),
                "team has fewer eligible reviewers than requested"
            );
        }

        let pr = PullRequest::new(id, title, &author.id, reviewers);
        pr.validate().map_err(DomainError::ValidationFailed)?;
        self.pull_requests.create(&pr).await?;

        info!(reviewers = ?pr.reviewer_ids, "pull request created");
        Ok(pr)
    }

    /// Replace `old_reviewer_id` on an open pull request with a random
    /// eligible member of that reviewer's team, keeping its position.
    #[instrument(skip_all, fields(pr_id = %pr_id, old_reviewer_id = %old_reviewer_id))]
    pub async fn reassign_reviewer(
        &self,
        pr_id: &str,
        old_reviewer_id: &str,
    ) -> DomainResult<Reassignment> {
        let mut pr = self
            .pull_requests
            .get(pr_id)
            .await?
            .ok_or_else(|| DomainError::not_found(Entity::PullRequest, pr_id))?;

        if pr.is_merged() {
            return Err(DomainError::AlreadyMerged(pr.id));
        }

        if !pr.has_reviewer(old_reviewer_id) {
            return Err(DomainError::ReviewerNotAssigned {
                pr_id: pr.id,
                reviewer_id: old_reviewer_id.to_string(),
            });
        }

        let old_reviewer = self
            .users
            .get(old_reviewer_id)
            .await?
            .ok_or_else(|| DomainError::not_found(Entity::User, old_reviewer_id))?;

        let members = self.users.list_active_by_team(&old_reviewer.team_name).await?;

        let mut exclude: HashSet<&str> = pr.reviewer_ids.iter().map(String::as_str).collect();
        exclude.insert(old_reviewer.id.as_str());
        if self.policy.exclude_author_on_reassign {
            exclude.insert(pr.author_id.as_str());
        }

        let pool = build_pool(&members, &exclude);
        let Some(replacement) = self.selector.single_draw(&pool) else {
            warn!(team = %old_reviewer.team_name, "no replacement reviewer available");
            return Err(DomainError::NoAvailableReviewers(pr.id));
        };

        pr.replace_reviewer(old_reviewer_id, replacement.clone());
        pr.version = self.pull_requests.update(&pr).await?;

        info!(replaced_by = %replacement, reviewers = ?pr.reviewer_ids, "reviewer reassigned");
        Ok(Reassignment {
            pull_request: pr,
            replaced_by: replacement,
        })
    }

    /// Mark a pull request merged. Merging an already merged pull request
    /// returns it unchanged.
    #[instrument(skip_all, fields(pr_id = %pr_id))]
    pub async fn merge_pull_request(&self, pr_id: &str) -> DomainResult<PullRequest> {
        let mut pr = self
            .pull_requests
            .get(pr_id)
            .await?
            .ok_or_else(|| DomainError::not_found(Entity::PullRequest, pr_id))?;

        if !pr.merge(Utc::now()) {
            debug!("pull request already merged");
            return Ok(pr);
        }

        pr.version = self.pull_requests.update(&pr).await?;

        info!(merged_at = ?pr.merged_at, "pull request merged");
        Ok(pr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryDirectory, InMemoryPullRequestStore};
    use crate::domain::errors::ErrorKind;
    use crate::domain::models::{PullRequestStatus, User};
    use crate::services::random::SeededRandom;

    struct Fixture {
        directory: Arc<InMemoryDirectory>,
        store: Arc<InMemoryPullRequestStore>,
        service: AssignmentService,
    }

    fn fixture(users: Vec<User>) -> Fixture {
        let directory = Arc::new(InMemoryDirectory::with_users(users));
        let store = Arc::new(InMemoryPullRequestStore::new());
        let service = AssignmentService::new(
            directory.clone(),
            store.clone(),
            Arc::new(SeededRandom::from_seed(42)),
        );
        Fixture { directory, store, service }
    }

    fn t1(ids: &[&str]) -> Vec<User> {
        ids.iter().map(|id| User::new(*id, format!("User {id}"), "t1")).collect()
    }

    #[tokio::test]
    async fn test_create_assigns_two_teammates() {
        let f = fixture(t1(&["u1", "u2", "u3"]));
        let pr = f.service.create_pull_request("pr1", "Title", "u1").await.unwrap();

        assert_eq!(pr.status, PullRequestStatus::Open);
        assert!(pr.merged_at.is_none());
        let mut reviewers = pr.reviewer_ids.clone();
        reviewers.sort();
        assert_eq!(reviewers, vec!["u2", "u3"]);
        assert!(f.store.get("pr1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_with_lone_author_assigns_nobody() {
        let f = fixture(t1(&["u1"]));
        let pr = f.service.create_pull_request("pr1", "Title", "u1").await.unwrap();
        assert!(pr.reviewer_ids.is_empty());
    }

    #[tokio::test]
    async fn test_create_skips_inactive_teammates() {
        let mut users = t1(&["u1", "u2"]);
        users.push(User::new("u3", "User u3", "t1").inactive());
        let f = fixture(users);

        let pr = f.service.create_pull_request("pr1", "Title", "u1").await.unwrap();
        assert_eq!(pr.reviewer_ids, vec!["u2"]);
    }

    #[tokio::test]
    async fn test_create_duplicate_id_fails() {
        let f = fixture(t1(&["u1", "u2", "u3"]));
        f.service.create_pull_request("pr1", "Title", "u1").await.unwrap();
        let err = f.service.create_pull_request("pr1", "Other", "u2").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_create_unknown_author_fails() {
        let f = fixture(t1(&["u1"]));
        let err = f.service.create_pull_request("pr1", "Title", "ghost").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.entity(), Some(Entity::User));
    }

    #[tokio::test]
    async fn test_create_inactive_author_fails() {
        let f = fixture(vec![User::new("u1", "User u1", "t1").inactive()]);
        let err = f.service.create_pull_request("pr1", "Title", "u1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthorInactive);
    }

    #[tokio::test]
    async fn test_reassign_replaces_in_place() {
        let f = fixture(t1(&["u1", "u2", "u3", "u4"]));
        let pr = PullRequest::new("pr1", "Title", "u1", vec!["u2".into(), "u3".into()]);
        f.store.create(&pr).await.unwrap();

        let result = f.service.reassign_reviewer("pr1", "u2").await.unwrap();
        assert_eq!(result.replaced_by, "u4");
        assert_eq!(result.pull_request.reviewer_ids, vec!["u4", "u3"]);

        let stored = f.store.get("pr1").await.unwrap().unwrap();
        assert_eq!(stored.reviewer_ids, vec!["u4", "u3"]);
        assert_eq!(stored.version, result.pull_request.version);
    }

    #[tokio::test]
    async fn test_reassign_without_candidates_fails() {
        let f = fixture(t1(&["u1", "u2", "u3"]));
        let pr = PullRequest::new("pr1", "Title", "u1", vec!["u2".into(), "u3".into()]);
        f.store.create(&pr).await.unwrap();

        let err = f.service.reassign_reviewer("pr1", "u2").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoAvailableReviewers);
    }

    #[tokio::test]
    async fn test_reassign_author_policy() {
        // Only the author is left once both reviewers are excluded.
        let users = t1(&["u1", "u2", "u3"]);
        let pr = PullRequest::new("pr1", "Title", "u1", vec!["u2".into(), "u3".into()]);

        let strict = fixture(users.clone());
        strict.store.create(&pr).await.unwrap();
        let err = strict.service.reassign_reviewer("pr1", "u3").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoAvailableReviewers);

        let mut lenient = fixture(users);
        lenient.service = lenient.service.with_policy(AssignmentPolicy {
            exclude_author_on_reassign: false,
        });
        lenient.store.create(&pr).await.unwrap();
        let result = lenient.service.reassign_reviewer("pr1", "u3").await.unwrap();
        assert_eq!(result.replaced_by, "u1");
    }

    #[tokio::test]
    async fn test_reassign_checks_in_order() {
        let f = fixture(t1(&["u1", "u2", "u3", "u4"]));
        let err = f.service.reassign_reviewer("missing", "u2").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let pr = PullRequest::new("pr1", "Title", "u1", vec!["u2".into(), "ghost".into()]);
        f.store.create(&pr).await.unwrap();

        let err = f.service.reassign_reviewer("pr1", "u4").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReviewerNotAssigned);

        let err = f.service.reassign_reviewer("pr1", "ghost").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.entity(), Some(Entity::User));
    }

    #[tokio::test]
    async fn test_reassign_on_merged_fails_even_with_candidates() {
        let f = fixture(t1(&["u1", "u2", "u3", "u4", "u5"]));
        f.service.create_pull_request("pr1", "Title", "u1").await.unwrap();
        let merged = f.service.merge_pull_request("pr1").await.unwrap();

        let old = merged.reviewer_ids[0].clone();
        let err = f.service.reassign_reviewer("pr1", &old).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyMerged);
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let f = fixture(t1(&["u1", "u2", "u3"]));
        f.service.create_pull_request("pr1", "Title", "u1").await.unwrap();

        let first = f.service.merge_pull_request("pr1").await.unwrap();
        assert_eq!(first.status, PullRequestStatus::Merged);
        assert!(first.merged_at.is_some());

        let second = f.service.merge_pull_request("pr1").await.unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_merge_unknown_fails() {
        let f = fixture(t1(&["u1"]));
        let err = f.service.merge_pull_request("nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_deactivated_reviewer_is_not_drawn() {
        let f = fixture(t1(&["u1", "u2", "u3", "u4", "u5"]));
        let pr = PullRequest::new("pr1", "Title", "u1", vec!["u2".into(), "u3".into()]);
        f.store.create(&pr).await.unwrap();
        f.directory.set_active("u4", false).await.unwrap();

        let result = f.service.reassign_reviewer("pr1", "u2").await.unwrap();
        assert_eq!(result.replaced_by, "u5");
    }
}
