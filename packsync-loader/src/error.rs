//! Error types for packsync-loader.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading a module.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The artifact file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The platform loader refused the file.
    #[error("failed to load module {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    /// The module loaded but does not export the configured entry symbol.
    #[error("module {path} does not export `{symbol}`")]
    MissingSymbol { path: PathBuf, symbol: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LoadError {
    LoadError::Io {
        path: path.into(),
        source,
    }
}
