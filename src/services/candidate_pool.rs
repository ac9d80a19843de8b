//! Candidate pool builder.

use std::collections::HashSet;

use crate::domain::models::User;

/// Reviewer identities eligible for assignment: every given team member
/// whose ID is not in `exclude`.
///
/// Callers pass only active members. An empty result is a normal outcome
/// that the caller must handle.
pub fn build_pool(members: &[User], exclude: &HashSet<&str>) -> Vec<String> {
    members
        .iter()
        .filter(|u| !exclude.contains(u.id.as_str()))
        .map(|u| u.id.clone())
        .collect()
}
