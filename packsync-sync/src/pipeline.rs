//! Sync-and-load pipeline used by `packsync load`.
//!
//! For every artifact, in name order:
//!
//! 1. Inline check through [`SyncEngine::sync`].
//! 2. If that replaced the file, run the full [`update_all`] pass so the rest
//!    of the directory is brought current before anything else loads.
//! 3. Hand the (now current) file to the [`ModuleLoader`].
//!
//! Nothing here returns an error: every per-artifact failure is logged and
//! folded into the [`PipelineSummary`].

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Serialize;

use packsync_core::{ArtifactName, Digest};
use packsync_loader::ModuleLoader;

use crate::engine::{update_all, SyncEngine, SyncOutcome};
use crate::inventory::ArtifactDir;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// What replaced an artifact during a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateTrigger {
    /// The artifact's own inline check.
    Inline,
    /// A batch pass triggered by an earlier artifact.
    Batch,
}

/// Sync half of an item report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncStatus {
    Updated { trigger: UpdateTrigger },
    Unchanged,
    Failed { kind: String, reason: String },
}

/// Load half of an item report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    Loaded { digest: Digest },
    Failed { reason: String },
}

/// Per-artifact outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub name: ArtifactName,
    pub path: PathBuf,
    pub sync: SyncStatus,
    pub load: LoadStatus,
}

/// Aggregate counts plus per-item reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub updated: usize,
    pub unchanged: usize,
    pub sync_failed: usize,
    pub load_failed: usize,
    pub loaded: usize,
    /// How many times a full batch pass was triggered.
    pub batch_passes: usize,
    pub items: Vec<ItemReport>,
}

impl PipelineSummary {
    fn record(&mut self, item: ItemReport) {
        match item.sync {
            SyncStatus::Updated { .. } => self.updated += 1,
            SyncStatus::Unchanged => self.unchanged += 1,
            SyncStatus::Failed { .. } => self.sync_failed += 1,
        }
        match item.load {
            LoadStatus::Loaded { .. } => self.loaded += 1,
            LoadStatus::Failed { .. } => self.load_failed += 1,
        }
        self.items.push(item);
    }

    /// Number of load attempts made.
    pub fn load_attempts(&self) -> usize {
        self.loaded + self.load_failed
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Sync every artifact in `dir`, then load it.
pub fn run(
    engine: &SyncEngine,
    dir: &ArtifactDir,
    loader: &mut dyn ModuleLoader,
) -> PipelineSummary {
    let mut summary = PipelineSummary::default();

    let artifacts = match dir.scan() {
        Ok(artifacts) => artifacts,
        Err(e) => {
            tracing::warn!("{e}");
            return summary;
        }
    };
    if artifacts.is_empty() {
        tracing::info!(
            "no .{} files found in {}",
            dir.extension(),
            dir.path().display()
        );
        return summary;
    }

    // Artifacts replaced by a batch pass before their own inline check.
    let mut refreshed: HashSet<ArtifactName> = HashSet::new();

    for artifact in &artifacts {
        let name = &artifact.name;
        tracing::info!("checking for updates for: {name}");

        let sync = match engine.sync(artifact, false) {
            Ok(SyncOutcome::Updated { .. }) => {
                tracing::info!("update found for {name}, running the full update pass");
                summary.batch_passes += 1;
                match update_all(engine, dir) {
                    Ok(batch) => refreshed.extend(batch.updated().cloned()),
                    Err(e) => tracing::warn!("update pass failed: {e}"),
                }
                SyncStatus::Updated {
                    trigger: UpdateTrigger::Inline,
                }
            }
            Ok(_) if refreshed.contains(name) => SyncStatus::Updated {
                trigger: UpdateTrigger::Batch,
            },
            Ok(_) => SyncStatus::Unchanged,
            Err(e) => {
                tracing::warn!("error checking for update for {name}: {e}");
                SyncStatus::Failed {
                    kind: e.kind().to_string(),
                    reason: e.to_string(),
                }
            }
        };

        tracing::info!("loading: {name}");
        let load = match loader.load(artifact) {
            Ok(module) => {
                tracing::info!("successfully loaded: {name}");
                LoadStatus::Loaded {
                    digest: module.digest,
                }
            }
            Err(e) => {
                tracing::warn!("failed to load '{name}': {e}");
                LoadStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        summary.record(ItemReport {
            name: name.clone(),
            path: artifact.path.clone(),
            sync,
            load,
        });
    }

    tracing::info!("{} modules loaded successfully", summary.loaded);
    summary
}
