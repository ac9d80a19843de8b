//! HTTP server wiring: shared state, router and listener.

use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::application::ServiceContext;
use crate::domain::models::ServerConfig;
use crate::services::{AssignmentService, TeamService};

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable CORS.
    pub enable_cors: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for HttpConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            enable_cors: config.enable_cors,
        }
    }
}

/// Services shared by every request.
pub struct AppState {
    pub assignments: Arc<AssignmentService>,
    pub teams: Arc<TeamService>,
}

impl AppState {
    pub fn new(assignments: Arc<AssignmentService>, teams: Arc<TeamService>) -> Self {
        Self { assignments, teams }
    }
}

impl From<ServiceContext> for AppState {
    fn from(ctx: ServiceContext) -> Self {
        Self::new(ctx.assignments, ctx.teams)
    }
}

/// Build the router.
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let app = Router::new()
        .route("/health", get(handlers::health_check))
        // Teams
        .route("/team/add", post(handlers::add_team))
        .route("/team/get", get(handlers::get_team))
        // Users
        .route("/users/setIsActive", post(handlers::set_user_active))
        .route("/users/getReview", get(handlers::get_review_queue))
        // Pull requests
        .route("/pullRequest/create", post(handlers::create_pull_request))
        .route("/pullRequest/merge", post(handlers::merge_pull_request))
        .route("/pullRequest/reassign", post(handlers::reassign_reviewer))
        // Stats
        .route("/stats/assignments", get(handlers::assignment_stats))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state));

    if enable_cors {
        app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .layer(TraceLayer::new_for_http())
    } else {
        app.layer(TraceLayer::new_for_http())
    }
}

/// Reviewer assignment HTTP server.
pub struct HttpServer {
    config: HttpConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(state: AppState, config: HttpConfig) -> Self {
        Self { config, state }
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let listener = TcpListener::bind(addr).await?;
        serve_listener(listener, self.state, self.config.enable_cors, shutdown).await
    }
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve_listener<F>(
    listener: TcpListener,
    state: AppState,
    enable_cors: bool,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(state, enable_cors);
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
