//! Last-known-good backups.
//!
//! Layout:
//!
//! ```text
//! <backup_dir>/<artifact file name>   (one per artifact, overwritten each update)
//! ```
//!
//! The store never deletes and never reads its own backups back; restoring
//! one is a manual operation.

use std::path::{Path, PathBuf};

use chrono::Utc;

use packsync_core::{BackupRecord, LocalArtifact};

use crate::error::{io_err, SyncError};
use crate::writer::{sync_parent_dir, tmp_path_for};

/// Backup area for one artifact directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the backup of `artifact` lives (it may not exist yet).
    pub fn backup_path(&self, artifact: &LocalArtifact) -> PathBuf {
        match artifact.path.file_name() {
            Some(file_name) => self.dir.join(file_name),
            None => self.dir.join(artifact.name.as_str()),
        }
    }

    /// Copy the artifact's current bytes into the backup area.
    ///
    /// The copy is written to a temporary sibling, flushed, and renamed over
    /// any previous backup; on unix the backup directory is then flushed too.
    /// When this returns `Ok` the backup is complete, visible to subsequent
    /// reads, and on stable storage.
    pub fn backup(&self, artifact: &LocalArtifact) -> Result<BackupRecord, SyncError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;

        let dest = self.backup_path(artifact);
        let tmp = tmp_path_for(&dest);

        let copied = std::fs::copy(&artifact.path, &tmp)
            .map_err(|e| io_err(&artifact.path, e))
            .and_then(|_| sync_file(&tmp));
        if let Err(e) = copied {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        if let Err(e) = std::fs::rename(&tmp, &dest) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&dest, e));
        }
        sync_parent_dir(&dest)?;

        tracing::info!(
            "backup created for '{}' at {}",
            artifact.name,
            dest.display()
        );
        Ok(BackupRecord {
            name: artifact.name.clone(),
            path: dest,
            created_at: Utc::now(),
        })
    }
}

fn sync_file(path: &Path) -> Result<(), SyncError> {
    let file = std::fs::File::options()
        .write(true)
        .open(path)
        .map_err(|e| io_err(path, e))?;
    file.sync_all().map_err(|e| io_err(path, e))
}
