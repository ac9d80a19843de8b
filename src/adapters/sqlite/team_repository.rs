//! SQLite implementation of the TeamRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::user_repository::UserRow;
use super::{is_unique_violation, parse_datetime};
use crate::domain::errors::{DomainError, DomainResult, Entity};
use crate::domain::models::{Team, User};
use crate::domain::ports::TeamRepository;

#[derive(Clone)]
pub struct SqliteTeamRepository {
    pool: SqlitePool,
}

impl SqliteTeamRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamRepository for SqliteTeamRepository {
    async fn exists(&self, name: &str) -> DomainResult<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM teams WHERE team_name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn get(&self, name: &str) -> DomainResult<Option<Team>> {
        let row: Option<TeamRow> = sqlx::query_as("SELECT team_name, created_at FROM teams WHERE team_name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Team::try_from).transpose()
    }

    async fn create(&self, team: &Team) -> DomainResult<()> {
        sqlx::query("INSERT INTO teams (team_name, created_at) VALUES (?, ?)")
            .bind(&team.name)
            .bind(team.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::already_exists(Entity::Team, &team.name)
                } else {
                    e.into()
                }
            })?;

        Ok(())
    }

    async fn upsert_members(&self, team_name: &str, members: &[User]) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        let team: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM teams WHERE team_name = ?")
            .bind(team_name)
            .fetch_optional(&mut *tx)
            .await?;
        if team.is_none() {
            return Err(DomainError::not_found(Entity::Team, team_name));
        }

        for member in members {
            sqlx::query(
                r#"INSERT INTO users (user_id, username, is_active, team_name) VALUES (?, ?, ?, ?)
                   ON CONFLICT(user_id) DO UPDATE SET
                       username = excluded.username,
                       is_active = excluded.is_active,
                       team_name = excluded.team_name"#
            )
            .bind(&member.id)
            .bind(&member.username)
            .bind(member.is_active)
            .bind(team_name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_members(&self, team_name: &str) -> DomainResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT user_id, username, is_active, team_name FROM users WHERE team_name = ? ORDER BY user_id"
        )
        .bind(team_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}

#[derive(sqlx::FromRow)]
struct TeamRow {
    team_name: String,
    created_at: String,
}

impl TryFrom<TeamRow> for Team {
    type Error = DomainError;

    fn try_from(row: TeamRow) -> Result<Self, Self::Error> {
        Ok(Team {
            name: row.team_name,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::errors::ErrorKind;

    async fn setup_test_repo() -> SqliteTeamRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteTeamRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_team() {
        let repo = setup_test_repo().await;
        let team = Team::new("backend");
        repo.create(&team).await.unwrap();

        assert!(repo.exists("backend").await.unwrap());
        let stored = repo.get("backend").await.unwrap().unwrap();
        assert_eq!(stored, team);
        assert!(repo.get("frontend").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_team() {
        let repo = setup_test_repo().await;
        repo.create(&Team::new("backend")).await.unwrap();
        let err = repo.create(&Team::new("backend")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(err.entity(), Some(Entity::Team));
    }

    #[tokio::test]
    async fn test_upsert_moves_members() {
        let repo = setup_test_repo().await;
        repo.create(&Team::new("a")).await.unwrap();
        repo.create(&Team::new("b")).await.unwrap();

        repo.upsert_members("a", &[User::new("u2", "Bob", "a"), User::new("u1", "Alice", "a")])
            .await
            .unwrap();
        repo.upsert_members("b", &[User::new("u2", "Robert", "a").inactive()])
            .await
            .unwrap();

        let a = repo.list_members("a").await.unwrap();
        assert_eq!(a.iter().map(|u| u.id.as_str()).collect::<Vec<_>>(), vec!["u1"]);

        let b = repo.list_members("b").await.unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].username, "Robert");
        assert_eq!(b[0].team_name, "b");
        assert!(!b[0].is_active);
    }

    #[tokio::test]
    async fn test_upsert_into_unknown_team() {
        let repo = setup_test_repo().await;
        let err = repo
            .upsert_members("ghost", &[User::new("u1", "Alice", "ghost")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
