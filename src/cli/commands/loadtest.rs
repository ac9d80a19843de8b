//! `loadtest`: drive create + merge traffic at a fixed rate.

use anyhow::{Context, Result};
use clap::Args;
use governor::{Quota, RateLimiter};
use rand::Rng;
use reqwest::StatusCode;
use serde::Serialize;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cli::client::{ApiClient, ApiResponse, DEFAULT_BASE_URL};
use crate::cli::output::{output, CommandOutput};

#[derive(Args, Debug, Clone)]
pub struct LoadtestArgs {
    /// Server base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// How long to generate traffic, in seconds
    #[arg(long, default_value_t = 30)]
    pub duration_secs: u64,

    /// Scenarios started per second
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub rps: u32,

    /// Authors are drawn uniformly from u1..=uN
    #[arg(long, default_value_t = 80, value_parser = clap::value_parser!(u32).range(1..))]
    pub authors: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadtestOutput {
    pub launched: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub elapsed_ms: u64,
}

impl CommandOutput for LoadtestOutput {
    fn to_human(&self) -> String {
        format!(
            "Load test finished in {:.1}s. Launched={} Success={} Failed={}",
            self.elapsed_ms as f64 / 1000.0,
            self.launched,
            self.succeeded,
            self.failed
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Create `pr_id` for `author` and merge it.
///
/// A 409 on create (duplicate ID, inactive author, ...) ends the scenario
/// successfully without merging.
pub async fn create_and_merge(client: &ApiClient, pr_id: &str, author: &str) -> Result<()> {
    let title = format!("Load test PR {pr_id}");
    match client.create_pull_request(pr_id, &title, author).await? {
        ApiResponse::Success(_) => {}
        ApiResponse::Failure { status, .. } if status == StatusCode::CONFLICT => return Ok(()),
        ApiResponse::Failure { status, error } => {
            anyhow::bail!("create {pr_id}: unexpected status {status} ({})", error.code)
        }
    }

    match client.merge_pull_request(pr_id).await? {
        ApiResponse::Success(_) => Ok(()),
        ApiResponse::Failure { status, error } => {
            anyhow::bail!("merge {pr_id}: unexpected status {status} ({})", error.code)
        }
    }
}

pub async fn run(client: &ApiClient, args: &LoadtestArgs) -> Result<LoadtestOutput> {
    let rps = NonZeroU32::new(args.rps).context("rps must be at least 1")?;
    let limiter = RateLimiter::direct(Quota::per_second(rps));
    let started = Instant::now();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(args.duration_secs);

    info!(rps = args.rps, duration_secs = args.duration_secs, "starting load test");

    let mut tasks = JoinSet::new();
    let mut summary = LoadtestOutput::default();

    loop {
        tokio::select! {
            _ = limiter.until_ready() => {}
            _ = tokio::time::sleep_until(deadline) => break,
        }
        if tokio::time::Instant::now() >= deadline {
            break;
        }

        summary.launched += 1;
        let pr_id = format!("lt-pr-{}", summary.launched);
        let author = format!("u{}", rand::thread_rng().gen_range(1..=args.authors));
        let client = client.clone();
        tasks.spawn(async move { create_and_merge(&client, &pr_id, &author).await });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => summary.succeeded += 1,
            Ok(Err(e)) => {
                debug!(error = %e, "scenario failed");
                summary.failed += 1;
            }
            Err(e) => {
                warn!(error = %e, "scenario task panicked");
                summary.failed += 1;
            }
        }
    }

    summary.elapsed_ms = started.elapsed().as_millis() as u64;
    info!(succeeded = summary.succeeded, failed = summary.failed, "load test finished");
    Ok(summary)
}

pub async fn execute(args: LoadtestArgs, json_mode: bool) -> Result<()> {
    let client = ApiClient::with_timeout(&args.base_url, Duration::from_secs(3))?;
    let summary = run(&client, &args).await?;
    output(&summary, json_mode);
    Ok(())
}
