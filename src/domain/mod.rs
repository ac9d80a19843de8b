//! Domain layer for the reviewer assignment system
//!
//! This module contains the core models, port traits and error taxonomy.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, Entity, ErrorKind};
