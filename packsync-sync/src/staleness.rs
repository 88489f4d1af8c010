//! Dry-run staleness report used by `packsync check`.
//!
//! Runs the same [`SyncEngine::sync`] path with `dry_run = true`, so a
//! `Stale` verdict here means exactly "`packsync update` would replace this".

use std::path::PathBuf;

use serde::Serialize;

use packsync_core::{ArtifactName, Digest};

use crate::engine::{SyncEngine, SyncOutcome};
use crate::error::SyncError;
use crate::inventory::ArtifactDir;

/// Staleness classification for one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StalenessSignal {
    /// Local digest equals the remote digest.
    Current { digest: Digest },
    /// Local digest differs from the remote digest.
    Stale { local: Digest, remote: Digest },
    /// The check itself failed (fetch, read, or authenticity gate).
    Unknown { kind: String, reason: String },
}

/// One row of a staleness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub name: ArtifactName,
    pub path: PathBuf,
    pub signal: StalenessSignal,
}

/// Check every artifact in `dir` without writing anything.
pub fn check(engine: &SyncEngine, dir: &ArtifactDir) -> Result<Vec<ArtifactStatus>, SyncError> {
    let artifacts = dir.scan()?;
    let mut rows = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let signal = match engine.sync(&artifact, true) {
            Ok(SyncOutcome::Unchanged { digest, .. }) => StalenessSignal::Current { digest },
            Ok(SyncOutcome::WouldUpdate { local, remote, .. }) => {
                StalenessSignal::Stale { local, remote }
            }
            Ok(SyncOutcome::Updated { previous, current, .. }) => StalenessSignal::Stale {
                local: previous,
                remote: current,
            },
            Err(e) => {
                tracing::warn!("error checking '{}': {e}", artifact.name);
                StalenessSignal::Unknown {
                    kind: e.kind().to_string(),
                    reason: e.to_string(),
                }
            }
        };
        rows.push(ArtifactStatus {
            name: artifact.name,
            path: artifact.path,
            signal,
        });
    }
    Ok(rows)
}
