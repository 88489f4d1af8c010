//! `packsync.yaml` settings.
//!
//! # Lookup
//!
//! ```text
//! <root>/packsync.yaml            (per-installation, preferred)
//! <home>/.packsync/config.yaml    (per-user fallback)
//! ```
//!
//! A missing file is not an error: every field has a default. Relative
//! directories are resolved against the root directory that was passed in.
//!
//! # API pattern
//!
//! As with the rest of the workspace, functions that touch the user's home
//! take it explicitly (`_at`) and have a thin wrapper that derives it from
//! `dirs::home_dir()`. Tests always use the `_at` form.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::error::ConfigError;
use crate::types::ArtifactName;

pub const SETTINGS_FILE: &str = "packsync.yaml";
pub const DEFAULT_URL_TEMPLATE: &str = "https://nuv.pack.bloxycola.online/{name}";
/// The platform's shared-library extension (`so`, `dylib`, `dll`), so the
/// default layout is loadable by the native loader.
pub const DEFAULT_EXTENSION: &str = std::env::consts::DLL_EXTENSION;
pub const DEFAULT_MODS_DIR: &str = "mods";
pub const DEFAULT_BACKUP_DIR: &str = "mods_backup";
pub const DEFAULT_CENSOR_WORDS_FILE: &str = "censorwords.yml";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// What to do when the pre-replacement backup cannot be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackupPolicy {
    /// Log the failure and replace the artifact anyway.
    #[default]
    BestEffort,
    /// Leave the artifact untouched unless the backup succeeded.
    Required,
}

/// Remote endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Endpoint template; `{name}` is replaced with the artifact name.
    pub url_template: String,
    /// Global request timeout. `None` keeps the transport default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            timeout_secs: None,
        }
    }
}

impl RemoteSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Dynamic loader settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoaderSettings {
    /// Symbol every loaded module must export, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_symbol: Option<String>,
}

/// Root of `packsync.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub remote: RemoteSettings,
    pub mods_dir: PathBuf,
    pub backup_dir: PathBuf,
    /// Artifact file extension, without the leading dot. Defaults to the
    /// platform's shared-library extension.
    pub extension: String,
    pub backup_policy: BackupPolicy,
    /// Optional allowlist: artifact name → expected SHA-256 of the remote bytes.
    pub pinned_digests: BTreeMap<String, String>,
    pub loader: LoaderSettings,
    pub censor_words_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remote: RemoteSettings::default(),
            mods_dir: PathBuf::from(DEFAULT_MODS_DIR),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            backup_policy: BackupPolicy::default(),
            pinned_digests: BTreeMap::new(),
            loader: LoaderSettings::default(),
            censor_words_file: PathBuf::from(DEFAULT_CENSOR_WORDS_FILE),
        }
    }
}

impl Settings {
    /// Artifact directory, resolved against `root`.
    pub fn mods_dir_at(&self, root: &Path) -> PathBuf {
        resolve(root, &self.mods_dir)
    }

    /// Backup directory, resolved against `root`.
    pub fn backup_dir_at(&self, root: &Path) -> PathBuf {
        resolve(root, &self.backup_dir)
    }

    /// Word-list file, resolved against `root`.
    pub fn censor_words_path_at(&self, root: &Path) -> PathBuf {
        resolve(root, &self.censor_words_file)
    }

    /// Extension with any leading dot stripped.
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    /// Parsed pinned digests.
    pub fn pinned(&self) -> Result<BTreeMap<ArtifactName, Digest>, ConfigError> {
        self.pinned_digests
            .iter()
            .map(|(name, value)| {
                Digest::parse(value)
                    .map(|d| (ArtifactName::from(name.as_str()), d))
                    .ok_or_else(|| ConfigError::InvalidDigest {
                        name: name.clone(),
                        value: value.clone(),
                    })
            })
            .collect()
    }
}

fn resolve(root: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// `<root>/packsync.yaml` — pure, no I/O.
pub fn settings_path_at(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}

/// `<home>/.packsync/config.yaml` — pure, no I/O.
pub fn user_settings_path_at(home: &Path) -> PathBuf {
    home.join(".packsync").join("config.yaml")
}

/// Load settings from an explicit file.
///
/// Returns defaults if the file does not exist, `ConfigError::Parse` (with
/// path + line context) if it is malformed, and `ConfigError::InvalidDigest`
/// if a pinned digest is not valid hex.
pub fn load_from(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // An empty document deserializes to `()`, not a map.
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings: Settings =
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    settings.pinned()?;
    Ok(settings)
}

/// Resolve settings for `root`, falling back to the per-user file under `home`.
pub fn discover_at(root: &Path, home: &Path) -> Result<Settings, ConfigError> {
    let local = settings_path_at(root);
    if local.exists() {
        return load_from(&local);
    }
    load_from(&user_settings_path_at(home))
}

/// `discover_at` convenience wrapper.
pub fn discover(root: &Path) -> Result<Settings, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    discover_at(root, &home)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
