//! SQLite implementation of the PullRequestRepository.
//!
//! Reviewer slots live in `pull_request_reviewers` with an explicit
//! `position` so that replacement keeps the original order.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{is_unique_violation, parse_datetime, parse_optional_datetime};
use crate::domain::errors::{DomainError, DomainResult, Entity};
use crate::domain::models::{PullRequest, PullRequestShort, PullRequestStatus, ReviewerAssignmentStat};
use crate::domain::ports::PullRequestRepository;

#[derive(Clone)]
pub struct SqlitePullRequestRepository {
    pool: SqlitePool,
}

impl SqlitePullRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn insert_reviewers(
    tx: &mut Transaction<'_, Sqlite>,
    pr_id: &str,
    reviewer_ids: &[String],
) -> DomainResult<()> {
    for (position, reviewer_id) in reviewer_ids.iter().enumerate() {
        sqlx::query("INSERT INTO pull_request_reviewers (pr_id, reviewer_id, position) VALUES (?, ?, ?)")
            .bind(pr_id)
            .bind(reviewer_id)
            .bind(position as i64)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

fn version_to_db(version: u64) -> DomainResult<i64> {
    i64::try_from(version).map_err(|_| DomainError::SerializationError(format!("Version out of range: {version}")))
}

#[async_trait]
impl PullRequestRepository for SqlitePullRequestRepository {
    async fn exists(&self, id: &str) -> DomainResult<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM pull_requests WHERE pull_request_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn create(&self, pr: &PullRequest) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, status, created_at, merged_at, version)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(&pr.id)
        .bind(&pr.title)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(pr.created_at.to_rfc3339())
        .bind(pr.merged_at.map(|t| t.to_rfc3339()))
        .bind(version_to_db(pr.version)?)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::already_exists(Entity::PullRequest, &pr.id)
            } else {
                e.into()
            }
        })?;

        insert_reviewers(&mut tx, &pr.id, &pr.reviewer_ids).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> DomainResult<Option<PullRequest>> {
        let row: Option<PullRequestRow> = sqlx::query_as(
            r#"SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at, version
               FROM pull_requests WHERE pull_request_id = ?"#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reviewers: Vec<(String,)> = sqlx::query_as(
            "SELECT reviewer_id FROM pull_request_reviewers WHERE pr_id = ? ORDER BY position"
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut pr = PullRequest::try_from(row)?;
        pr.reviewer_ids = reviewers.into_iter().map(|(r,)| r).collect();
        Ok(Some(pr))
    }

    async fn update(&self, pr: &PullRequest) -> DomainResult<u64> {
        let expected = version_to_db(pr.version)?;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"UPDATE pull_requests SET pull_request_name = ?, status = ?, merged_at = ?, version = version + 1
               WHERE pull_request_id = ? AND version = ?"#
        )
        .bind(&pr.title)
        .bind(pr.status.as_str())
        .bind(pr.merged_at.map(|t| t.to_rfc3339()))
        .bind(&pr.id)
        .bind(expected)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM pull_requests WHERE pull_request_id = ?")
                .bind(&pr.id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match found {
                Some(_) => DomainError::ConcurrencyConflict {
                    entity: Entity::PullRequest,
                    id: pr.id.clone(),
                },
                None => DomainError::not_found(Entity::PullRequest, &pr.id),
            });
        }

        sqlx::query("DELETE FROM pull_request_reviewers WHERE pr_id = ?")
            .bind(&pr.id)
            .execute(&mut *tx)
            .await?;
        insert_reviewers(&mut tx, &pr.id, &pr.reviewer_ids).await?;

        tx.commit().await?;
        Ok(pr.version + 1)
    }

    async fn list_by_reviewer(&self, user_id: &str) -> DomainResult<Vec<PullRequestShort>> {
        let rows: Vec<PullRequestShortRow> = sqlx::query_as(
            r#"SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status
               FROM pull_requests p
               JOIN pull_request_reviewers r ON r.pr_id = p.pull_request_id
               WHERE r.reviewer_id = ?
               ORDER BY p.pull_request_id"#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PullRequestShort::try_from).collect()
    }

    async fn reviewer_assignment_stats(&self) -> DomainResult<Vec<ReviewerAssignmentStat>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT reviewer_id, COUNT(*) FROM pull_request_reviewers GROUP BY reviewer_id ORDER BY reviewer_id"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, count)| ReviewerAssignmentStat {
                user_id,
                count: count.max(0) as u64,
            })
            .collect())
    }
}

fn parse_status(s: &str) -> DomainResult<PullRequestStatus> {
    PullRequestStatus::parse(s)
        .ok_or_else(|| DomainError::SerializationError(format!("Invalid status: {s}")))
}

#[derive(sqlx::FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    created_at: String,
    merged_at: Option<String>,
    version: i64,
}

impl TryFrom<PullRequestRow> for PullRequest {
    type Error = DomainError;

    fn try_from(row: PullRequestRow) -> Result<Self, Self::Error> {
        let version = u64::try_from(row.version)
            .map_err(|_| DomainError::SerializationError(format!("Invalid version: {}", row.version)))?;

        Ok(PullRequest {
            status: parse_status(&row.status)?,
            created_at: parse_datetime(&row.created_at)?,
            merged_at: parse_optional_datetime(row.merged_at)?,
            id: row.pull_request_id,
            title: row.pull_request_name,
            author_id: row.author_id,
            reviewer_ids: Vec::new(),
            version,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PullRequestShortRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
}

impl TryFrom<PullRequestShortRow> for PullRequestShort {
    type Error = DomainError;

    fn try_from(row: PullRequestShortRow) -> Result<Self, Self::Error> {
        Ok(PullRequestShort {
            status: parse_status(&row.status)?,
            id: row.pull_request_id,
            title: row.pull_request_name,
            author_id: row.author_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteTeamRepository};
    use crate::domain::errors::ErrorKind;
    use crate::domain::models::{Team, User};
    use crate::domain::ports::TeamRepository;

    async fn setup_test_repo() -> SqlitePullRequestRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        let teams = SqliteTeamRepository::new(pool.clone());
        teams.create(&Team::new("backend")).await.unwrap();
        let members: Vec<User> = (1..=4)
            .map(|i| User::new(format!("u{i}"), format!("User {i}"), "backend"))
            .collect();
        teams.upsert_members("backend", &members).await.unwrap();
        SqlitePullRequestRepository::new(pool)
    }

    fn reviewers(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_and_get_keeps_reviewer_order() {
        let repo = setup_test_repo().await;
        let pr = PullRequest::new("pr1", "Add search", "u1", reviewers(&["u3", "u2"]));
        repo.create(&pr).await.unwrap();

        assert!(repo.exists("pr1").await.unwrap());
        let stored = repo.get("pr1").await.unwrap().unwrap();
        assert_eq!(stored, pr);
        assert!(repo.get("pr2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_create_leaves_original() {
        let repo = setup_test_repo().await;
        repo.create(&PullRequest::new("pr1", "First", "u1", reviewers(&["u2"])))
            .await
            .unwrap();

        let err = repo
            .create(&PullRequest::new("pr1", "Second", "u2", reviewers(&["u3"])))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let stored = repo.get("pr1").await.unwrap().unwrap();
        assert_eq!(stored.title, "First");
        assert_eq!(stored.reviewer_ids, vec!["u2"]);
    }

    #[tokio::test]
    async fn test_update_replaces_reviewers_and_bumps_version() {
        let repo = setup_test_repo().await;
        repo.create(&PullRequest::new("pr1", "T", "u1", reviewers(&["u2", "u3"])))
            .await
            .unwrap();

        let mut pr = repo.get("pr1").await.unwrap().unwrap();
        let stale = pr.clone();
        pr.replace_reviewer("u2", "u4");
        assert_eq!(repo.update(&pr).await.unwrap(), 2);

        let stored = repo.get("pr1").await.unwrap().unwrap();
        assert_eq!(stored.reviewer_ids, vec!["u4", "u3"]);
        assert_eq!(stored.version, 2);

        let err = repo.update(&stale).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConcurrencyConflict);
        let stored = repo.get("pr1").await.unwrap().unwrap();
        assert_eq!(stored.reviewer_ids, vec!["u4", "u3"]);
    }

    #[tokio::test]
    async fn test_update_merge_round_trips_timestamp() {
        let repo = setup_test_repo().await;
        repo.create(&PullRequest::new("pr1", "T", "u1", vec![])).await.unwrap();

        let mut pr = repo.get("pr1").await.unwrap().unwrap();
        pr.merge(chrono::Utc::now());
        pr.version = repo.update(&pr).await.unwrap();

        assert_eq!(repo.get("pr1").await.unwrap().unwrap(), pr);
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let repo = setup_test_repo().await;
        let err = repo
            .update(&PullRequest::new("ghost", "T", "u1", vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_by_reviewer_and_stats() {
        let repo = setup_test_repo().await;
        repo.create(&PullRequest::new("pr2", "B", "u1", reviewers(&["u2"])))
            .await
            .unwrap();
        repo.create(&PullRequest::new("pr1", "A", "u1", reviewers(&["u2", "u3"])))
            .await
            .unwrap();

        let queue = repo.list_by_reviewer("u2").await.unwrap();
        assert_eq!(queue.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["pr1", "pr2"]);
        assert_eq!(queue[0].status, PullRequestStatus::Open);
        assert!(repo.list_by_reviewer("u4").await.unwrap().is_empty());

        let stats = repo.reviewer_assignment_stats().await.unwrap();
        assert_eq!(
            stats,
            vec![
                ReviewerAssignmentStat { user_id: "u2".into(), count: 2 },
                ReviewerAssignmentStat { user_id: "u3".into(), count: 1 },
            ]
        );
    }
}
