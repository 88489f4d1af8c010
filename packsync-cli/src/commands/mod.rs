pub mod chat;
pub mod check;
pub mod load;
pub mod update;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use packsync_core::{config, Settings};
use packsync_sync::{ArtifactDir, SyncEngine};

/// Resolved root directory plus the settings every subcommand works from.
#[derive(Debug)]
pub struct Context {
    pub root: PathBuf,
    pub settings: Settings,
}

impl Context {
    pub fn resolve(root: PathBuf, config_path: Option<&Path>) -> Result<Self> {
        let settings = match config_path {
            Some(path) => config::load_from(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => config::discover(&root).context("failed to load settings")?,
        };
        Ok(Self { root, settings })
    }

    pub fn artifact_dir(&self) -> ArtifactDir {
        ArtifactDir::from_settings(&self.root, &self.settings)
    }

    pub fn engine(&self) -> Result<SyncEngine> {
        SyncEngine::from_settings(&self.root, &self.settings)
            .context("failed to configure sync engine")
    }
}
