//! CLI command implementations.

pub mod loadtest;
pub mod seed;
pub mod serve;
pub mod stats;
