//! Application wiring: picks concrete adapters and builds the services.

pub mod context;

pub use context::ServiceContext;
