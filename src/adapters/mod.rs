//! Adapters for the domain ports and the outside world.
//!
//! - `sqlite`: persistent storage
//! - `memory`: in-process storage for tests and ephemeral servers
//! - `http`: JSON API

pub mod http;
pub mod memory;
pub mod sqlite;
