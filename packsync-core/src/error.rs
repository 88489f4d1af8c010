//! Error types for packsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A pinned digest in the settings is not a 64-character hex string.
    #[error("invalid pinned digest for '{name}': {value:?}")]
    InvalidDigest { name: String, value: String },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}
