//! packsync core library — artifact identity, content digests, settings.
//!
//! - [`types`] — artifact newtypes and value snapshots
//! - [`digest`] — SHA-256 content digests
//! - [`config`] — `packsync.yaml` settings and path resolution
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod digest;
pub mod error;
pub mod types;

pub use config::{BackupPolicy, LoaderSettings, RemoteSettings, Settings};
pub use digest::{digest, Digest};
pub use error::ConfigError;
pub use types::{ArtifactName, ArtifactSnapshot, BackupRecord, LocalArtifact};
