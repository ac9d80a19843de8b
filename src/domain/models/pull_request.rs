//! Pull request domain model.
//!
//! A pull request enters the system `OPEN` with up to two reviewers chosen
//! from the author's team and leaves it `MERGED`. Merging is one-way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on reviewers attached to a single pull request.
pub const MAX_REVIEWERS: usize = 2;

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestStatus {
    /// Under review; reviewers may be reassigned
    #[default]
    Open,
    /// Terminal
    Merged,
}

impl PullRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OPEN" => Some(Self::Open),
            "MERGED" => Some(Self::Merged),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Merged)
    }
}

/// A unit of work under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Caller-supplied, globally unique identity
    pub id: String,
    pub title: String,
    pub author_id: String,
    pub status: PullRequestStatus,
    /// Ordered, distinct, at most [`MAX_REVIEWERS`]; never contains the author
    pub reviewer_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Set exactly once, on the first transition to `MERGED`
    pub merged_at: Option<DateTime<Utc>>,
    /// Version for optimistic locking
    pub version: u64,
}

impl PullRequest {
    /// Create a new open pull request with the given reviewers.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author_id: impl Into<String>,
        reviewer_ids: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author_id: author_id.into(),
            status: PullRequestStatus::Open,
            reviewer_ids,
            created_at: Utc::now(),
            merged_at: None,
            version: 1,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.reviewer_ids.iter().any(|r| r == user_id)
    }

    /// Replace `old` with `new` in place, keeping its position.
    ///
    /// Returns false if `old` is not a current reviewer.
    pub fn replace_reviewer(&mut self, old: &str, new: impl Into<String>) -> bool {
        match self.reviewer_ids.iter().position(|r| r == old) {
            Some(pos) => {
                self.reviewer_ids[pos] = new.into();
                true
            }
            None => false,
        }
    }

    /// Transition to `MERGED`, stamping `merged_at` if it is not set yet.
    ///
    /// Returns false (and changes nothing) when already merged.
    pub fn merge(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_merged() {
            return false;
        }
        self.status = PullRequestStatus::Merged;
        if self.merged_at.is_none() {
            self.merged_at = Some(at);
        }
        true
    }

    /// Check the record-level invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Pull request id cannot be empty".to_string());
        }
        if self.author_id.trim().is_empty() {
            return Err("Pull request author cannot be empty".to_string());
        }
        if self.reviewer_ids.len() > MAX_REVIEWERS {
            return Err(format!(
                "Pull request {} has {} reviewers (max {MAX_REVIEWERS})",
                self.id,
                self.reviewer_ids.len()
            ));
        }
        if self.has_reviewer(&self.author_id) {
            return Err(format!("Author {} cannot review their own pull request", self.author_id));
        }
        if self.reviewer_ids.len() == MAX_REVIEWERS && self.reviewer_ids[0] == self.reviewer_ids[1] {
            return Err(format!("Pull request {} has duplicate reviewers", self.id));
        }
        if self.is_merged() != self.merged_at.is_some() {
            return Err(format!("Pull request {} has inconsistent merge timestamp", self.id));
        }
        Ok(())
    }
}

/// Compact pull request view used when listing a reviewer's queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    pub id: String,
    pub title: String,
    pub author_id: String,
    pub status: PullRequestStatus,
}

impl From<&PullRequest> for PullRequestShort {
    fn from(pr: &PullRequest) -> Self {
        Self {
            id: pr.id.clone(),
            title: pr.title.clone(),
            author_id: pr.author_id.clone(),
            status: pr.status,
        }
    }
}

/// How many times a user has been assigned as reviewer, across all history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerAssignmentStat {
    pub user_id: String,
    pub count: u64,
}
