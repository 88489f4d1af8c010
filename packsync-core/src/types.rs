//! Domain types for artifacts and their backups.
//!
//! An artifact has no version number: the file at its local path *is* the
//! current version. Content is carried around as an immutable
//! [`ArtifactSnapshot`] so sync decisions are made against a point-in-time
//! view rather than an open file handle.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::digest::{digest, Digest};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Artifact name: the file stem, unique within the artifact directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactName(pub String);

impl ArtifactName {
    /// Derive the name from a file path's stem.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .map(|stem| Self(stem.to_string_lossy().into_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ArtifactName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ArtifactName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// An artifact discovered in the local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifact {
    pub name: ArtifactName,
    pub path: PathBuf,
}

impl LocalArtifact {
    /// Build from a path, deriving the name from the file stem.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let name = ArtifactName::from_path(&path)?;
        Some(Self { name, path })
    }
}

/// Point-in-time content of an artifact, either read locally or fetched.
///
/// The digest is recomputed on every call and never cached.
#[derive(Clone, PartialEq, Eq)]
pub struct ArtifactSnapshot {
    name: ArtifactName,
    bytes: Vec<u8>,
}

impl ArtifactSnapshot {
    pub fn new(name: ArtifactName, bytes: Vec<u8>) -> Self {
        Self { name, bytes }
    }

    pub fn name(&self) -> &ArtifactName {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn digest(&self) -> Digest {
        digest(&self.bytes)
    }

    /// Two snapshots are equivalent iff their digests match.
    pub fn same_content(&self, other: &ArtifactSnapshot) -> bool {
        self.digest() == other.digest()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for ArtifactSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactSnapshot")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The last-known-good copy of an artifact, written just before replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub name: ArtifactName,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
