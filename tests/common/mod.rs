//! Common test utilities for integration tests
//!
//! Provides service fixtures backed by a migrated in-memory SQLite pool and
//! a helper that runs the HTTP API on an ephemeral port.

use reviewer_assign::adapters::http::{serve_listener, AppState};
use reviewer_assign::adapters::sqlite::create_migrated_test_pool;
use reviewer_assign::domain::models::{AssignmentConfig, User};
use reviewer_assign::ServiceContext;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Services over a fresh migrated SQLite pool with a fixed RNG seed.
#[allow(dead_code)]
pub async fn sqlite_context(seed: u64) -> ServiceContext {
    let pool = create_migrated_test_pool()
        .await
        .expect("Failed to create test pool");
    let config = AssignmentConfig {
        seed: Some(seed),
        ..AssignmentConfig::default()
    };
    ServiceContext::sqlite(pool, &config)
}

/// Onboard `team` with active members `ids` (ids prefixed with `!` are inactive).
#[allow(dead_code)]
pub async fn onboard(ctx: &ServiceContext, team: &str, ids: &[&str]) {
    let members = ids
        .iter()
        .map(|raw| match raw.strip_prefix('!') {
            Some(id) => User::new(id, format!("User {id}"), team).inactive(),
            None => User::new(*raw, format!("User {raw}"), team),
        })
        .collect();
    ctx.teams
        .create_team_with_members(team, members)
        .await
        .expect("Failed to onboard team");
}

/// A running API server; dropping it without `stop` leaves the task detached.
#[allow(dead_code)]
pub struct TestServer {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<anyhow::Result<()>>,
}

#[allow(dead_code)]
impl TestServer {
    /// Bind 127.0.0.1:0 and serve `ctx` in the background.
    pub async fn start(ctx: ServiceContext) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(serve_listener(
            listener,
            AppState::from(ctx),
            false,
            async move {
                let _ = rx.await;
            },
        ));

        Self {
            base_url: format!("http://{addr}"),
            shutdown: Some(tx),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Trigger graceful shutdown and wait for the server task.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle
            .await
            .expect("Server task panicked")
            .expect("Server returned an error");
    }
}
