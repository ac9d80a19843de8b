//! `stats`: print reviewer assignment counts.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::adapters::http::dto::AssignmentStatDto;
use crate::cli::client::{ApiClient, DEFAULT_BASE_URL};
use crate::cli::output::{list_table, output, render_list, CommandOutput};

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Server base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsOutput {
    pub stats: Vec<AssignmentStatDto>,
    pub total_assignments: u64,
}

impl From<Vec<AssignmentStatDto>> for StatsOutput {
    fn from(stats: Vec<AssignmentStatDto>) -> Self {
        let total_assignments = stats.iter().map(|s| s.assigned_count).sum();
        Self {
            stats,
            total_assignments,
        }
    }
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["user", "assigned"]);
        for stat in &self.stats {
            table.add_row(vec![stat.user_id.clone(), stat.assigned_count.to_string()]);
        }
        let rendered = render_list("reviewer", table, self.stats.len());
        if self.stats.is_empty() {
            rendered
        } else {
            format!("{rendered}\n\nTotal assignments: {}", self.total_assignments)
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: StatsArgs, json_mode: bool) -> Result<()> {
    let client = ApiClient::new(&args.base_url)?;
    let stats = client.assignment_stats().await?.into_result()?;
    output(&StatsOutput::from(stats.stats), json_mode);
    Ok(())
}
