//! Authenticity gate for fetched content.
//!
//! Digest comparison only says the remote bytes *differ* from the local
//! ones. Whether those bytes are trustworthy is a separate question, answered
//! here before anything on disk is touched.

use std::collections::BTreeMap;

use packsync_core::{ArtifactName, ArtifactSnapshot, Digest};

/// Decides whether fetched bytes may replace a local artifact.
pub trait AuthenticityGate {
    /// `Err` carries a human-readable rejection reason.
    fn verify(&self, remote: &ArtifactSnapshot) -> Result<(), String>;
}

/// Trusts whatever the remote serves.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl AuthenticityGate for AcceptAll {
    fn verify(&self, _remote: &ArtifactSnapshot) -> Result<(), String> {
        Ok(())
    }
}

/// Allowlist of expected digests per artifact name.
///
/// Pinned artifacts must match their pin exactly; artifacts without a pin
/// pass through.
#[derive(Debug, Clone, Default)]
pub struct PinnedDigests {
    pins: BTreeMap<ArtifactName, Digest>,
}

impl PinnedDigests {
    pub fn new(pins: BTreeMap<ArtifactName, Digest>) -> Self {
        Self { pins }
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

impl AuthenticityGate for PinnedDigests {
    fn verify(&self, remote: &ArtifactSnapshot) -> Result<(), String> {
        let Some(expected) = self.pins.get(remote.name()) else {
            return Ok(());
        };
        let actual = remote.digest();
        if &actual == expected {
            Ok(())
        } else {
            Err(format!(
                "digest {} does not match pinned {}",
                actual.short(),
                expected.short()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packsync_core::digest;

    fn snapshot(name: &str, bytes: &[u8]) -> ArtifactSnapshot {
        ArtifactSnapshot::new(name.into(), bytes.to_vec())
    }

    #[test]
    fn accept_all_accepts() {
        assert!(AcceptAll.verify(&snapshot("alpha", b"anything")).is_ok());
    }

    #[test]
    fn pinned_match_passes_and_mismatch_fails() {
        let gate = PinnedDigests::new(BTreeMap::from([(ArtifactName::from("alpha"), digest(b"v2"))]));
        assert!(gate.verify(&snapshot("alpha", b"v2")).is_ok());
        let reason = gate.verify(&snapshot("alpha", b"evil")).unwrap_err();
        assert!(reason.contains("pinned"));
    }

    #[test]
    fn unpinned_names_pass() {
        let gate = PinnedDigests::new(BTreeMap::from([(ArtifactName::from("alpha"), digest(b"v2"))]));
        assert!(gate.verify(&snapshot("beta", b"whatever")).is_ok());
    }
}
