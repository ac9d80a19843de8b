//! In-memory adapters for the domain ports.
//!
//! Provide the same failure semantics as the SQLite adapters (duplicate
//! create, version conflicts, unknown IDs) without a database. Used by
//! service tests and `serve --in-memory`.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult, Entity};
use crate::domain::models::{
    PullRequest, PullRequestShort, ReviewerAssignmentStat, Team, User,
};
use crate::domain::ports::{PullRequestRepository, TeamRepository, UserRepository};

fn lock<T>(mutex: &Mutex<T>) -> DomainResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| DomainError::DatabaseError("in-memory store lock poisoned".to_string()))
}

// ---------------------------------------------------------------------------
// InMemoryDirectory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct DirectoryState {
    teams: BTreeMap<String, Team>,
    users: BTreeMap<String, User>,
}

/// Users and teams backed by ordered maps.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    state: Mutex<DirectoryState>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory pre-populated with `users`; their teams are created implicitly.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut state = DirectoryState::default();
        for user in users {
            state
                .teams
                .entry(user.team_name.clone())
                .or_insert_with(|| Team::new(user.team_name.clone()));
            state.users.insert(user.id.clone(), user);
        }
        Self {
            state: Mutex::new(state),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryDirectory {
    async fn get(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(lock(&self.state)?.users.get(id).cloned())
    }

    async fn list_active_by_team(&self, team_name: &str) -> DomainResult<Vec<User>> {
        Ok(lock(&self.state)?
            .users
            .values()
            .filter(|u| u.is_active && u.team_name == team_name)
            .cloned()
            .collect())
    }

    async fn set_active(&self, id: &str, is_active: bool) -> DomainResult<Option<User>> {
        let mut state = lock(&self.state)?;
        Ok(state.users.get_mut(id).map(|u| {
            u.is_active = is_active;
            u.clone()
        }))
    }
}

#[async_trait]
impl TeamRepository for InMemoryDirectory {
    async fn exists(&self, name: &str) -> DomainResult<bool> {
        Ok(lock(&self.state)?.teams.contains_key(name))
    }

    async fn get(&self, name: &str) -> DomainResult<Option<Team>> {
        Ok(lock(&self.state)?.teams.get(name).cloned())
    }

    async fn create(&self, team: &Team) -> DomainResult<()> {
        let mut state = lock(&self.state)?;
        if state.teams.contains_key(&team.name) {
            return Err(DomainError::already_exists(Entity::Team, &team.name));
        }
        state.teams.insert(team.name.clone(), team.clone());
        Ok(())
    }

    async fn upsert_members(&self, team_name: &str, members: &[User]) -> DomainResult<()> {
        let mut state = lock(&self.state)?;
        if !state.teams.contains_key(team_name) {
            return Err(DomainError::not_found(Entity::Team, team_name));
        }
        for member in members {
            let mut user = member.clone();
            user.team_name = team_name.to_string();
            state.users.insert(user.id.clone(), user);
        }
        Ok(())
    }

    async fn list_members(&self, team_name: &str) -> DomainResult<Vec<User>> {
        Ok(lock(&self.state)?
            .users
            .values()
            .filter(|u| u.team_name == team_name)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// InMemoryPullRequestStore
// ---------------------------------------------------------------------------

/// Pull requests keyed by ID.
#[derive(Debug, Default)]
pub struct InMemoryPullRequestStore {
    pull_requests: Mutex<BTreeMap<String, PullRequest>>,
}

impl InMemoryPullRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PullRequestRepository for InMemoryPullRequestStore {
    async fn exists(&self, id: &str) -> DomainResult<bool> {
        Ok(lock(&self.pull_requests)?.contains_key(id))
    }

    async fn create(&self, pr: &PullRequest) -> DomainResult<()> {
        let mut prs = lock(&self.pull_requests)?;
        if prs.contains_key(&pr.id) {
            return Err(DomainError::already_exists(Entity::PullRequest, &pr.id));
        }
        prs.insert(pr.id.clone(), pr.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> DomainResult<Option<PullRequest>> {
        Ok(lock(&self.pull_requests)?.get(id).cloned())
    }

    async fn update(&self, pr: &PullRequest) -> DomainResult<u64> {
        let mut prs = lock(&self.pull_requests)?;
        let stored = prs
            .get_mut(&pr.id)
            .ok_or_else(|| DomainError::not_found(Entity::PullRequest, &pr.id))?;

        if stored.version != pr.version {
            return Err(DomainError::ConcurrencyConflict {
                entity: Entity::PullRequest,
                id: pr.id.clone(),
            });
        }

        let mut next = pr.clone();
        next.version += 1;
        // created_at is set once on insert.
        next.created_at = stored.created_at;
        *stored = next;
        Ok(stored.version)
    }

    async fn list_by_reviewer(&self, user_id: &str) -> DomainResult<Vec<PullRequestShort>> {
        Ok(lock(&self.pull_requests)?
            .values()
            .filter(|pr| pr.has_reviewer(user_id))
            .map(PullRequestShort::from)
            .collect())
    }

    async fn reviewer_assignment_stats(&self) -> DomainResult<Vec<ReviewerAssignmentStat>> {
        let prs = lock(&self.pull_requests)?;
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for reviewer in prs.values().flat_map(|pr| pr.reviewer_ids.iter()) {
            *counts.entry(reviewer.as_str()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(user_id, count)| ReviewerAssignmentStat {
                user_id: user_id.to_string(),
                count,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_bumps_version_and_rejects_stale_writes() {
        let store = InMemoryPullRequestStore::new();
        let pr = PullRequest::new("pr1", "Title", "u1", vec!["u2".into()]);
        store.create(&pr).await.unwrap();

        let mut first = store.get("pr1").await.unwrap().unwrap();
        let stale = first.clone();

        first.replace_reviewer("u2", "u3");
        assert_eq!(store.update(&first).await.unwrap(), 2);

        let err = store.update(&stale).await.unwrap_err();
        assert!(matches!(err, DomainError::ConcurrencyConflict { .. }));

        let stored = store.get("pr1").await.unwrap().unwrap();
        assert_eq!(stored.reviewer_ids, vec!["u3"]);
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let store = InMemoryPullRequestStore::new();
        let pr = PullRequest::new("pr1", "Title", "u1", vec![]);
        let err = store.update(&pr).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_active_members_filter() {
        let dir = InMemoryDirectory::with_users(vec![
            User::new("u1", "A", "t1"),
            User::new("u2", "B", "t1").inactive(),
            User::new("u3", "C", "t2"),
        ]);
        let active = dir.list_active_by_team("t1").await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "u1");
        assert!(TeamRepository::exists(&dir, "t2").await.unwrap());
    }
}
