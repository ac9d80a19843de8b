//! JSON-over-HTTP transport for the assignment engine and directory.

pub mod dto;
pub mod handlers;
pub mod server;

pub use handlers::error_response;
pub use server::{build_router, serve_listener, AppState, HttpConfig, HttpServer};
