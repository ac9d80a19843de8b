//! Team onboarding, user directory and assignment reporting.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::errors::{DomainError, DomainResult, Entity};
use crate::domain::models::{PullRequestShort, ReviewerAssignmentStat, Team, User};
use crate::domain::ports::{PullRequestRepository, TeamRepository, UserRepository};

pub struct TeamService {
    teams: Arc<dyn TeamRepository>,
    users: Arc<dyn UserRepository>,
    pull_requests: Arc<dyn PullRequestRepository>,
}

impl TeamService {
    pub fn new(
        teams: Arc<dyn TeamRepository>,
        users: Arc<dyn UserRepository>,
        pull_requests: Arc<dyn PullRequestRepository>,
    ) -> Self {
        Self {
            teams,
            users,
            pull_requests,
        }
    }

    /// Create a team and upsert its roster.
    ///
    /// Members that already belong to another team are moved to this one.
    #[instrument(skip_all, fields(team = %team_name, members = members.len()))]
    pub async fn create_team_with_members(
        &self,
        team_name: &str,
        members: Vec<User>,
    ) -> DomainResult<(Team, Vec<User>)> {
        let team = Team::new(team_name);
        team.validate().map_err(DomainError::ValidationFailed)?;

        if self.teams.exists(team_name).await? {
            return Err(DomainError::already_exists(Entity::Team, team_name));
        }

        let members: Vec<User> = members
            .into_iter()
            .map(|mut m| {
                m.team_name = team.name.clone();
                m
            })
            .collect();
        for member in &members {
            member.validate().map_err(DomainError::ValidationFailed)?;
        }

        self.teams.create(&team).await?;
        self.teams.upsert_members(&team.name, &members).await?;

        let roster = self.teams.list_members(&team.name).await?;
        info!(roster = roster.len(), "team created");
        Ok((team, roster))
    }

    /// Get a team and its full roster.
    pub async fn get_team_with_members(&self, team_name: &str) -> DomainResult<(Team, Vec<User>)> {
        let team = self
            .teams
            .get(team_name)
            .await?
            .ok_or_else(|| DomainError::not_found(Entity::Team, team_name))?;
        let members = self.teams.list_members(&team.name).await?;
        Ok((team, members))
    }

    #[instrument(skip(self))]
    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> DomainResult<User> {
        let user = self
            .users
            .set_active(user_id, is_active)
            .await?
            .ok_or_else(|| DomainError::not_found(Entity::User, user_id))?;
        info!("user active flag updated");
        Ok(user)
    }

    /// Pull requests the user currently reviews.
    pub async fn list_pull_requests_for_reviewer(
        &self,
        user_id: &str,
    ) -> DomainResult<Vec<PullRequestShort>> {
        self.pull_requests.list_by_reviewer(user_id).await
    }

    pub async fn reviewer_assignment_stats(&self) -> DomainResult<Vec<ReviewerAssignmentStat>> {
        self.pull_requests.reviewer_assignment_stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryDirectory, InMemoryPullRequestStore};
    use crate::domain::errors::ErrorKind;
    use crate::domain::models::PullRequest;

    fn service() -> (TeamService, Arc<InMemoryPullRequestStore>) {
        let directory = Arc::new(InMemoryDirectory::new());
        let store = Arc::new(InMemoryPullRequestStore::new());
        (
            TeamService::new(directory.clone(), directory, store.clone()),
            store,
        )
    }

    fn member(id: &str) -> User {
        User::new(id, format!("User {id}"), "")
    }

    #[tokio::test]
    async fn test_create_team_with_members() {
        let (svc, _) = service();
        let (team, roster) = svc
            .create_team_with_members("backend", vec![member("u2"), member("u1").inactive()])
            .await
            .unwrap();

        assert_eq!(team.name, "backend");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].id, "u1");
        assert!(!roster[0].is_active);
        assert!(roster.iter().all(|u| u.team_name == "backend"));
    }

    #[tokio::test]
    async fn test_duplicate_team_fails() {
        let (svc, _) = service();
        svc.create_team_with_members("backend", vec![]).await.unwrap();
        let err = svc.create_team_with_members("backend", vec![]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(err.entity(), Some(Entity::Team));
    }

    #[tokio::test]
    async fn test_empty_team_name_rejected() {
        let (svc, _) = service();
        let err = svc.create_team_with_members("  ", vec![]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_member_moves_between_teams() {
        let (svc, _) = service();
        svc.create_team_with_members("a", vec![member("u1"), member("u2")]).await.unwrap();
        svc.create_team_with_members("b", vec![member("u2")]).await.unwrap();

        let (_, a) = svc.get_team_with_members("a").await.unwrap();
        let (_, b) = svc.get_team_with_members("b").await.unwrap();
        assert_eq!(a.iter().map(|u| u.id.as_str()).collect::<Vec<_>>(), vec!["u1"]);
        assert_eq!(b.iter().map(|u| u.id.as_str()).collect::<Vec<_>>(), vec!["u2"]);
    }

    #[tokio::test]
    async fn test_get_unknown_team() {
        let (svc, _) = service();
        let err = svc.get_team_with_members("nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_set_user_active() {
        let (svc, _) = service();
        svc.create_team_with_members("a", vec![member("u1")]).await.unwrap();

        let user = svc.set_user_active("u1", false).await.unwrap();
        assert!(!user.is_active);

        let err = svc.set_user_active("ghost", true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_reviewer_queue_and_stats() {
        let (svc, store) = service();
        store
            .create(&PullRequest::new("pr1", "A", "u1", vec!["u2".into(), "u3".into()]))
            .await
            .unwrap();
        store
            .create(&PullRequest::new("pr2", "B", "u1", vec!["u2".into()]))
            .await
            .unwrap();

        let queue = svc.list_pull_requests_for_reviewer("u2").await.unwrap();
        assert_eq!(queue.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["pr1", "pr2"]);

        let stats = svc.reviewer_assignment_stats().await.unwrap();
        assert_eq!(
            stats,
            vec![
                ReviewerAssignmentStat { user_id: "u2".into(), count: 2 },
                ReviewerAssignmentStat { user_id: "u3".into(), count: 1 },
            ]
        );
    }
}
