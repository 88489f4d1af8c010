//! # packsync-loader
//!
//! Brings artifacts into the running process as executable modules.
//!
//! The [`ModuleLoader`] trait is the only seam the sync pipeline sees, so a
//! stricter strategy (subprocess isolation, a WASM sandbox) can stand in for
//! [`DylibLoader`] without touching the sync engine.
//!
//! ```rust,no_run
//! use packsync_core::{LocalArtifact, LoaderSettings};
//! use packsync_loader::{DylibLoader, ModuleLoader};
//!
//! let mut loader = DylibLoader::new(LoaderSettings::default());
//! if let Some(artifact) = LocalArtifact::from_path("mods/alpha.so") {
//!     match loader.load(&artifact) {
//!         Ok(module) => println!("loaded {}", module.name),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

pub mod dylib;
pub mod error;

use std::path::PathBuf;

use packsync_core::{ArtifactName, Digest, LocalArtifact};

pub use dylib::DylibLoader;
pub use error::LoadError;

/// Opaque handle to a module that is resident for the rest of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleHandle(pub usize);

/// Result of a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub handle: ModuleHandle,
    pub name: ArtifactName,
    pub path: PathBuf,
    /// Digest of the bytes that were on disk when the module was opened.
    pub digest: Digest,
}

/// Loads a validated local artifact into the process.
///
/// There is no unload: once loaded a module stays resident.
pub trait ModuleLoader {
    fn load(&mut self, artifact: &LocalArtifact) -> Result<LoadedModule, LoadError>;

    /// Number of modules loaded so far.
    fn resident(&self) -> usize;
}
