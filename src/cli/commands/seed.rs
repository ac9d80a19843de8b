//! `seed`: create demo teams through the HTTP API.
//!
//! Teams are `team-01`, `team-02`, ...; odd teams get six members and even
//! teams five. User IDs run `u1`, `u2`, ... across teams and every seventh
//! user is created inactive.

use anyhow::Result;
use clap::Args;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::info;

use crate::adapters::http::dto::{TeamDto, TeamMemberDto};
use crate::cli::client::{ApiClient, ApiResponse, DEFAULT_BASE_URL};
use crate::cli::output::{output, CommandOutput};

#[derive(Args, Debug, Clone)]
pub struct SeedArgs {
    /// Server base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Number of teams to create
    #[arg(long, default_value_t = 15)]
    pub teams: usize,
}

/// Build the demo roster without touching the network.
pub fn build_teams(count: usize) -> Vec<TeamDto> {
    let mut next_user = 1usize;
    (1..=count)
        .map(|team_idx| {
            let size = if team_idx % 2 == 0 { 5 } else { 6 };
            let members = (0..size)
                .map(|_| {
                    let n = next_user;
                    next_user += 1;
                    TeamMemberDto {
                        user_id: format!("u{n}"),
                        username: format!("User{n}"),
                        is_active: n % 7 != 0,
                    }
                })
                .collect();
            TeamDto {
                team_name: format!("team-{team_idx:02}"),
                members,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedOutput {
    pub teams_created: usize,
    pub teams_skipped: usize,
    pub users: usize,
}

impl CommandOutput for SeedOutput {
    fn to_human(&self) -> String {
        let mut line = format!(
            "Seeded {} team(s) with {} user(s).",
            self.teams_created, self.users
        );
        if self.teams_skipped > 0 {
            line.push_str(&format!(" {} team(s) already existed.", self.teams_skipped));
        }
        line
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Post every team; existing teams are skipped, anything else aborts.
pub async fn seed(client: &ApiClient, teams: &[TeamDto]) -> Result<SeedOutput> {
    let mut summary = SeedOutput::default();

    for team in teams {
        match client.add_team(team).await? {
            ApiResponse::Success(created) => {
                info!(team = %team.team_name, members = created.team.members.len(), "team seeded");
                summary.teams_created += 1;
                summary.users += created.team.members.len();
            }
            ApiResponse::Failure { status, error }
                if status == StatusCode::BAD_REQUEST && error.code == "TEAM_EXISTS" =>
            {
                info!(team = %team.team_name, "team already exists, skipping");
                summary.teams_skipped += 1;
            }
            ApiResponse::Failure { status, error } => {
                anyhow::bail!(
                    "Failed to seed team {}: server returned {status} {}: {}",
                    team.team_name,
                    error.code,
                    error.message
                );
            }
        }
    }

    Ok(summary)
}

pub async fn execute(args: SeedArgs, json_mode: bool) -> Result<()> {
    let client = ApiClient::new(&args.base_url)?;
    let teams = build_teams(args.teams);
    let summary = seed(&client, &teams).await?;
    output(&summary, json_mode);
    Ok(())
}
