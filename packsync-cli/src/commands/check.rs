//! `packsync check` — dry-run staleness report.

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use packsync_sync::{
    staleness::{check, ArtifactStatus},
    StalenessSignal, SyncError,
};

use super::Context;

/// Arguments for `packsync check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let engine = ctx.engine()?;
        let dir = ctx.artifact_dir();

        let rows = match check(&engine, &dir) {
            Ok(rows) => rows,
            Err(SyncError::MissingDirectory { .. }) => Vec::new(),
            Err(e) => return Err(e).context("staleness check failed"),
        };

        if self.json {
            print_json(&rows)?;
        } else {
            print_table(&rows, &dir.path().display().to_string());
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct CheckReportJson<'a> {
    summary: CheckSummaryJson,
    artifacts: &'a [ArtifactStatus],
}

#[derive(Serialize)]
struct CheckSummaryJson {
    artifacts: usize,
    current: usize,
    stale: usize,
    unknown: usize,
}

#[derive(Tabled)]
struct CheckTableRow {
    #[tabled(rename = "artifact")]
    artifact: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn count(rows: &[ArtifactStatus], key: &str) -> usize {
    rows.iter().filter(|r| signal_key(&r.signal) == key).count()
}

fn print_json(rows: &[ArtifactStatus]) -> Result<()> {
    let payload = CheckReportJson {
        summary: CheckSummaryJson {
            artifacts: rows.len(),
            current: count(rows, "current"),
            stale: count(rows, "stale"),
            unknown: count(rows, "unknown"),
        },
        artifacts: rows,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize check JSON")?
    );
    Ok(())
}

fn print_table(rows: &[ArtifactStatus], dir: &str) {
    println!(
        "packsync v{} | {} artifacts | {} stale | {}",
        env!("CARGO_PKG_VERSION"),
        rows.len(),
        count(rows, "stale"),
        dir,
    );
    if rows.is_empty() {
        println!("No artifacts found.");
        return;
    }

    let table_rows: Vec<CheckTableRow> = rows
        .iter()
        .map(|row| CheckTableRow {
            artifact: row.name.to_string(),
            status: format!("{} {}", signal_indicator(&row.signal), signal_label(&row.signal)),
            detail: signal_detail(&row.signal),
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");

    if count(rows, "stale") > 0 {
        println!("Run 'packsync update' to fetch stale artifacts.");
    }
}

fn signal_key(signal: &StalenessSignal) -> &'static str {
    match signal {
        StalenessSignal::Current { .. } => "current",
        StalenessSignal::Stale { .. } => "stale",
        StalenessSignal::Unknown { .. } => "unknown",
    }
}

fn signal_label(signal: &StalenessSignal) -> &'static str {
    match signal {
        StalenessSignal::Current { .. } => "CURRENT",
        StalenessSignal::Stale { .. } => "STALE",
        StalenessSignal::Unknown { .. } => "UNKNOWN",
    }
}

fn signal_indicator(signal: &StalenessSignal) -> String {
    match signal {
        StalenessSignal::Current { .. } => "■".green().bold().to_string(),
        StalenessSignal::Stale { .. } => "■".yellow().bold().to_string(),
        StalenessSignal::Unknown { .. } => "■".red().bold().to_string(),
    }
}

fn signal_detail(signal: &StalenessSignal) -> String {
    match signal {
        StalenessSignal::Current { digest } => format!("up to date ({})", digest.short()),
        StalenessSignal::Stale { local, remote } => {
            format!("{} -> {}", local.short(), remote.short())
        }
        StalenessSignal::Unknown { reason, .. } => reason.clone(),
    }
}
