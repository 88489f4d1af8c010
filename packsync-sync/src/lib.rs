//! # packsync-sync
//!
//! Fetch, compare, back up and atomically replace local artifacts, then hand
//! them to a [`packsync_loader::ModuleLoader`].
//!
//! - [`SyncEngine::sync`] — one artifact
//! - [`update_all`] — standalone full-batch update pass
//! - [`pipeline::run`] — sync-and-load over a whole directory
//! - [`staleness::check`] — dry-run report

pub mod backup;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod gate;
pub mod inventory;
pub mod pipeline;
pub mod staleness;
pub mod writer;

pub use backup::BackupStore;
pub use engine::{update_all, BatchItem, BatchReport, SyncEngine, SyncOutcome};
pub use error::SyncError;
pub use fetch::{EndpointTemplate, HttpFetcher, RemoteFetcher};
pub use gate::{AcceptAll, AuthenticityGate, PinnedDigests};
pub use inventory::ArtifactDir;
pub use pipeline::{PipelineSummary, SyncStatus};
pub use staleness::StalenessSignal;
