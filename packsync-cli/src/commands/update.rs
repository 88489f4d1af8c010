//! `packsync update` — standalone full-batch update pass.

use anyhow::{Context as _, Result};
use clap::Args;

use packsync_sync::{update_all, SyncError, SyncOutcome};

use super::Context;

/// Arguments for `packsync update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {}

impl UpdateArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let engine = ctx.engine()?;
        let dir = ctx.artifact_dir();

        let report = match update_all(&engine, &dir) {
            Ok(report) => report,
            Err(SyncError::MissingDirectory { path }) => {
                println!("No artifact directory at {}; nothing to update.", path.display());
                return Ok(());
            }
            Err(e) => return Err(e).context("update pass failed"),
        };

        println!(
            "✓ update pass finished ({} updated, {} unchanged, {} failed)",
            report.updated_count(),
            report.unchanged_count(),
            report.failed_count()
        );
        for item in &report.items {
            match &item.result {
                Ok(SyncOutcome::Updated { previous, current, .. }) => println!(
                    "  ✎  {} {} -> {}",
                    item.artifact.name,
                    previous.short(),
                    current.short()
                ),
                Ok(_) => println!("  ·  {}", item.artifact.name),
                Err(e) => println!("  ✗  {}: {e}", item.artifact.name),
            }
        }
        Ok(())
    }
}
