//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces that infrastructure adapters must implement:
//! - UserRepository: user directory reads and active-flag updates
//! - TeamRepository: team onboarding
//! - PullRequestRepository: work-item store and assignment reporting
//! - RandomSource: randomness for reviewer selection
//!
//! The services depend only on these traits, so SQLite and in-memory
//! adapters are interchangeable.

pub mod pull_request_repository;
pub mod random_source;
pub mod team_repository;
pub mod user_repository;

pub use pull_request_repository::PullRequestRepository;
pub use random_source::RandomSource;
pub use team_repository::TeamRepository;
pub use user_repository::UserRepository;
