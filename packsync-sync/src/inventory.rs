//! Flat artifact directory listing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use packsync_core::{LocalArtifact, Settings};

use crate::error::{io_err, SyncError};

/// A flat directory of artifacts sharing one file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDir {
    dir: PathBuf,
    extension: String,
}

impl ArtifactDir {
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Artifact directory described by `settings`, resolved against `root`.
    pub fn from_settings(root: &Path, settings: &Settings) -> Self {
        Self::new(settings.mods_dir_at(root), settings.extension())
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// List artifacts, non-recursively, sorted by name. Symlinks to files
    /// are listed under the link's own name.
    ///
    /// Returns `SyncError::MissingDirectory` if the directory does not exist.
    pub fn scan(&self) -> Result<Vec<LocalArtifact>, SyncError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SyncError::MissingDirectory {
                    path: self.dir.clone(),
                });
            }
            Err(e) => return Err(io_err(&self.dir, e)),
        };

        let mut artifacts: Vec<LocalArtifact> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            // `is_file` follows symlinks; dangling links are skipped.
            .filter(|p| p.is_file() && self.matches_extension(p))
            .filter_map(|p| LocalArtifact::from_path(p))
            .collect();
        artifacts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(artifacts)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}
