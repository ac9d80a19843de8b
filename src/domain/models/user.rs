//! User domain model.
//!
//! Users are owned by the directory. The assignment engine only reads them;
//! the active flag is the single field changed after onboarding.

use serde::{Deserialize, Serialize};

/// A team member who can author pull requests and review them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Caller-supplied identity (e.g. "u1")
    pub id: String,
    /// Display name
    pub username: String,
    /// Only active users author pull requests or receive reviews
    pub is_active: bool,
    /// Name of the owning team
    pub team_name: String,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        team_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            is_active: true,
            team_name: team_name.into(),
        }
    }

    /// Mark the user inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("User id cannot be empty".to_string());
        }
        if self.team_name.trim().is_empty() {
            return Err(format!("User {} has no team", self.id));
        }
        Ok(())
    }
}
