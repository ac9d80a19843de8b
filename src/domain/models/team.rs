//! Team domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named group of users. Reviewers are always drawn from one team.
///
/// Teams are created once and never deleted; their roster lives on the
/// users (`User::team_name`) and grows through member upserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Team name cannot be empty".to_string());
        }
        if self.name.len() > 255 {
            return Err("Team name cannot exceed 255 characters".to_string());
        }
        Ok(())
    }
}
