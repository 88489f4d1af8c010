//! Error types for packsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use packsync_core::ConfigError;

/// All errors that can arise from sync operations.
///
/// Every variant is scoped to a single artifact (or the artifact directory);
/// batch callers fold them into their reports instead of aborting.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Fetching the remote bytes failed: DNS, connection, non-2xx status or
    /// a truncated body.
    #[error("fetch failed for '{name}' from {url}: {reason}")]
    Network {
        name: String,
        url: String,
        reason: String,
    },

    /// A local read, write, copy or rename failed, with annotated path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The authenticity gate refused the fetched bytes.
    #[error("remote content for '{name}' rejected: {reason}")]
    Untrusted { name: String, reason: String },

    /// The artifact directory does not exist.
    #[error("artifact directory not found: {path}")]
    MissingDirectory { path: PathBuf },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl SyncError {
    /// Short machine-readable kind, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Network { .. } => "network",
            SyncError::Io { .. } => "io",
            SyncError::Untrusted { .. } => "untrusted",
            SyncError::MissingDirectory { .. } => "missing_directory",
            SyncError::Config(_) => "config",
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
