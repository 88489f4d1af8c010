//! `packsync load` — sync every artifact, then load it.

use anyhow::Result;
use clap::Args;

use packsync_loader::DylibLoader;
use packsync_sync::pipeline::{self, LoadStatus, SyncStatus, UpdateTrigger};

use super::Context;

/// Arguments for `packsync load`.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Emit the pipeline summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl LoadArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let engine = ctx.engine()?;
        let mut loader = DylibLoader::new(ctx.settings.loader.clone());
        let summary = pipeline::run(&engine, &ctx.artifact_dir(), &mut loader);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        println!(
            "✓ {} loaded, {} load failures ({} updated, {} unchanged, {} sync failures)",
            summary.loaded,
            summary.load_failed,
            summary.updated,
            summary.unchanged,
            summary.sync_failed
        );
        for item in &summary.items {
            let sync = match &item.sync {
                SyncStatus::Updated {
                    trigger: UpdateTrigger::Inline,
                } => "updated".to_string(),
                SyncStatus::Updated {
                    trigger: UpdateTrigger::Batch,
                } => "updated (batch)".to_string(),
                SyncStatus::Unchanged => "unchanged".to_string(),
                SyncStatus::Failed { reason, .. } => format!("sync failed: {reason}"),
            };
            match &item.load {
                LoadStatus::Loaded { digest } => {
                    println!("  ✓  {} [{sync}] {}", item.name, digest.short())
                }
                LoadStatus::Failed { reason } => {
                    println!("  ✗  {} [{sync}] {reason}", item.name)
                }
            }
        }
        Ok(())
    }
}
