//! Artifact sync engine.
//!
//! ## `SyncEngine::sync` — per-artifact protocol
//!
//! 1. Fetch the remote bytes. Failure → `Network`; nothing local is touched.
//! 2. Read the local bytes.
//! 3. Digest both.
//! 4. Equal → `Unchanged` (no backup, no write).
//! 5. Different → authenticity gate, then back up the local file.
//! 6. Atomically replace the local file with the remote bytes.
//! 7. `Updated`.
//!
//! The inline check run by the load pipeline and the standalone batch pass
//! ([`update_all`]) both go through [`SyncEngine::sync`].

use std::path::{Path, PathBuf};

use serde::Serialize;

use packsync_core::{
    ArtifactName, ArtifactSnapshot, BackupPolicy, BackupRecord, Digest, LocalArtifact, Settings,
};

use crate::backup::BackupStore;
use crate::error::{io_err, SyncError};
use crate::fetch::{EndpointTemplate, HttpFetcher, RemoteFetcher};
use crate::gate::{AcceptAll, AuthenticityGate, PinnedDigests};
use crate::inventory::ArtifactDir;
use crate::writer;

// ---------------------------------------------------------------------------
// Sync outcome
// ---------------------------------------------------------------------------

/// Outcome of syncing one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The local file was replaced with the remote bytes.
    Updated {
        name: ArtifactName,
        path: PathBuf,
        previous: Digest,
        current: Digest,
        /// `None` when the backup failed under `BackupPolicy::BestEffort`.
        backup: Option<BackupRecord>,
    },
    /// Local and remote digests match.
    Unchanged {
        name: ArtifactName,
        path: PathBuf,
        digest: Digest,
    },
    /// Dry-run mode: the file *would* have been replaced.
    WouldUpdate {
        name: ArtifactName,
        path: PathBuf,
        local: Digest,
        remote: Digest,
    },
}

impl SyncOutcome {
    pub fn name(&self) -> &ArtifactName {
        match self {
            SyncOutcome::Updated { name, .. }
            | SyncOutcome::Unchanged { name, .. }
            | SyncOutcome::WouldUpdate { name, .. } => name,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, SyncOutcome::Updated { .. })
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Fetch → compare → back up → replace, for one artifact at a time.
pub struct SyncEngine {
    fetcher: Box<dyn RemoteFetcher>,
    gate: Box<dyn AuthenticityGate>,
    backups: BackupStore,
    policy: BackupPolicy,
}

impl SyncEngine {
    /// Engine with no authenticity gate and best-effort backups.
    pub fn new(fetcher: impl RemoteFetcher + 'static, backups: BackupStore) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            gate: Box::new(AcceptAll),
            backups,
            policy: BackupPolicy::default(),
        }
    }

    /// HTTP engine configured from `settings`, with directories resolved
    /// against `root`.
    pub fn from_settings(root: &Path, settings: &Settings) -> Result<Self, SyncError> {
        let fetcher = HttpFetcher::new(
            EndpointTemplate::new(settings.remote.url_template.as_str()),
            settings.remote.timeout(),
        );
        let pins = settings.pinned()?;
        let engine = Self::new(fetcher, BackupStore::new(settings.backup_dir_at(root)))
            .with_backup_policy(settings.backup_policy);
        if pins.is_empty() {
            Ok(engine)
        } else {
            Ok(engine.with_gate(PinnedDigests::new(pins)))
        }
    }

    pub fn with_gate(mut self, gate: impl AuthenticityGate + 'static) -> Self {
        self.gate = Box::new(gate);
        self
    }

    pub fn with_backup_policy(mut self, policy: BackupPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn backups(&self) -> &BackupStore {
        &self.backups
    }

    pub fn backup_policy(&self) -> BackupPolicy {
        self.policy
    }

    /// Sync one artifact. With `dry_run`, stops before the backup and reports
    /// [`SyncOutcome::WouldUpdate`] instead of writing.
    pub fn sync(&self, artifact: &LocalArtifact, dry_run: bool) -> Result<SyncOutcome, SyncError> {
        let name = &artifact.name;

        // Step 1: fetch.
        let remote = ArtifactSnapshot::new(name.clone(), self.fetcher.fetch(name)?);

        // Step 2: read local.
        let local_bytes = std::fs::read(&artifact.path).map_err(|e| io_err(&artifact.path, e))?;
        let local = ArtifactSnapshot::new(name.clone(), local_bytes);

        // Steps 3–4: compare.
        let local_digest = local.digest();
        let remote_digest = remote.digest();
        if local_digest == remote_digest {
            tracing::debug!("unchanged: {name} ({})", local_digest.short());
            return Ok(SyncOutcome::Unchanged {
                name: name.clone(),
                path: artifact.path.clone(),
                digest: local_digest,
            });
        }

        // Step 5: gate, then backup.
        self.gate
            .verify(&remote)
            .map_err(|reason| SyncError::Untrusted {
                name: name.to_string(),
                reason,
            })?;

        if dry_run {
            tracing::info!(
                "[dry-run] would update: {name} ({} -> {})",
                local_digest.short(),
                remote_digest.short()
            );
            return Ok(SyncOutcome::WouldUpdate {
                name: name.clone(),
                path: artifact.path.clone(),
                local: local_digest,
                remote: remote_digest,
            });
        }

        tracing::info!("update detected for {name}; creating a backup and updating");
        let backup = match self.backups.backup(artifact) {
            Ok(record) => Some(record),
            Err(e) => match self.policy {
                BackupPolicy::BestEffort => {
                    tracing::warn!("backup failed for {name}: {e}; replacing anyway");
                    None
                }
                BackupPolicy::Required => {
                    tracing::warn!("backup failed for {name}: {e}; leaving it untouched");
                    return Err(e);
                }
            },
        };

        // Step 6: replace.
        writer::replace_atomic(&artifact.path, remote.bytes())?;

        tracing::info!(
            "updated: {name} ({} -> {})",
            local_digest.short(),
            remote_digest.short()
        );
        Ok(SyncOutcome::Updated {
            name: name.clone(),
            path: artifact.path.clone(),
            previous: local_digest,
            current: remote_digest,
            backup,
        })
    }
}

// ---------------------------------------------------------------------------
// Batch pass
// ---------------------------------------------------------------------------

/// One artifact's result within a batch pass.
#[derive(Debug)]
pub struct BatchItem {
    pub artifact: LocalArtifact,
    pub result: Result<SyncOutcome, SyncError>,
}

/// Result of [`update_all`].
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn updated(&self) -> impl Iterator<Item = &ArtifactName> {
        self.items.iter().filter_map(|item| match &item.result {
            Ok(outcome) if outcome.is_updated() => Some(outcome.name()),
            _ => None,
        })
    }

    pub fn updated_count(&self) -> usize {
        self.updated().count()
    }

    pub fn unchanged_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.result, Ok(SyncOutcome::Unchanged { .. })))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.items.iter().filter(|item| item.result.is_err()).count()
    }
}

/// Standalone full-batch update pass over every artifact in `dir`.
///
/// Per-artifact failures are logged and recorded; they never stop the pass.
/// Only a directory that cannot be listed is returned as an error.
pub fn update_all(engine: &SyncEngine, dir: &ArtifactDir) -> Result<BatchReport, SyncError> {
    let artifacts = dir.scan()?;
    if artifacts.is_empty() {
        tracing::info!(
            "no .{} files found in {} to update",
            dir.extension(),
            dir.path().display()
        );
    }

    let mut report = BatchReport::default();
    for artifact in artifacts {
        tracing::info!("checking for updates for: {}", artifact.name);
        let result = engine.sync(&artifact, false);
        match &result {
            Ok(SyncOutcome::Updated { .. }) => {
                tracing::info!("'{}' was updated successfully", artifact.name)
            }
            Ok(_) => tracing::info!("no update needed for: {}", artifact.name),
            Err(e) => tracing::warn!("error updating '{}': {e}", artifact.name),
        }
        report.items.push(BatchItem { artifact, result });
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
