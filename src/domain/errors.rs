//! Domain errors for the reviewer assignment system.

use std::fmt;

use thiserror::Error;

/// Kind of record a lookup or uniqueness failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    User,
    Team,
    PullRequest,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Team => "team",
            Self::PullRequest => "pull request",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable classification of a [`DomainError`].
///
/// Transports match on this instead of on the error itself so that
/// message text can change without touching status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    AuthorInactive,
    AlreadyMerged,
    ReviewerNotAssigned,
    NoAvailableReviewers,
    ConcurrencyConflict,
    Validation,
    Storage,
}

/// Domain-level errors that can occur in the reviewer assignment system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: Entity, id: String },

    #[error("Author is not active: {0}")]
    AuthorInactive(String),

    #[error("Pull request is already merged: {0}")]
    AlreadyMerged(String),

    #[error("Reviewer {reviewer_id} is not assigned to pull request {pr_id}")]
    ReviewerNotAssigned { pr_id: String, reviewer_id: String },

    #[error("No available reviewers for pull request {0}")]
    NoAvailableReviewers(String),

    #[error("Concurrency conflict: {entity} {id} was modified")]
    ConcurrencyConflict { entity: Entity, id: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }

    pub fn already_exists(entity: Entity, id: impl Into<String>) -> Self {
        Self::AlreadyExists { entity, id: id.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::AuthorInactive(_) => ErrorKind::AuthorInactive,
            Self::AlreadyMerged(_) => ErrorKind::AlreadyMerged,
            Self::ReviewerNotAssigned { .. } => ErrorKind::ReviewerNotAssigned,
            Self::NoAvailableReviewers(_) => ErrorKind::NoAvailableReviewers,
            Self::ConcurrencyConflict { .. } => ErrorKind::ConcurrencyConflict,
            Self::ValidationFailed(_) => ErrorKind::Validation,
            Self::DatabaseError(_) | Self::SerializationError(_) => ErrorKind::Storage,
        }
    }

    /// The entity a `NotFound`/`AlreadyExists`/`ConcurrencyConflict` refers to.
    pub fn entity(&self) -> Option<Entity> {
        match self {
            Self::NotFound { entity, .. }
            | Self::AlreadyExists { entity, .. }
            | Self::ConcurrencyConflict { entity, .. } => Some(*entity),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
