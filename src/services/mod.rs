//! Service layer: reviewer selection, the assignment engine and onboarding.

pub mod assignment_service;
pub mod candidate_pool;
pub mod random;
pub mod reviewer_selector;
pub mod team_service;

pub use assignment_service::{AssignmentPolicy, AssignmentService, Reassignment};
pub use candidate_pool::build_pool;
pub use random::SeededRandom;
pub use reviewer_selector::ReviewerSelector;
pub use team_service::TeamService;
