//! SHA-256 content digests used for change detection.
//!
//! A [`Digest`] is always stored as lower-case hex, so comparing two digests
//! is case-insensitive regardless of how either side was written down.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// Hex-encoded SHA-256 digest of an artifact's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    /// Parse a hex digest, accepting either case.
    ///
    /// Returns `None` unless `s` is exactly 64 hex characters.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(s.to_ascii_lowercase()))
    }

    /// Case-insensitive comparison against a raw hex string.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines and tables.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for Digest {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Digest::parse(&s).ok_or_else(|| format!("not a SHA-256 hex digest: {s:?}"))
    }
}

impl From<Digest> for String {
    fn from(d: Digest) -> Self {
        d.0
    }
}

/// Compute the digest of `bytes`. Pure; defined for the empty buffer.
pub fn digest(bytes: &[u8]) -> Digest {
    let mut h = Sha256::new();
    h.update(bytes);
    Digest(hex::encode(h.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn empty_buffer_has_known_digest() {
        assert_eq!(digest(b"").as_str(), EMPTY_SHA256);
    }

    #[test]
    fn digest_is_deterministic() {
        let a = digest(b"some artifact bytes");
        let b = digest(b"some artifact bytes");
        assert_eq!(a, b);
        assert_ne!(a, digest(b"other bytes"));
    }

    #[test]
    fn parse_is_case_insensitive() {
        let upper = Digest::parse(&EMPTY_SHA256.to_uppercase()).unwrap();
        assert_eq!(upper, digest(b""));
        assert!(upper.matches(&EMPTY_SHA256.to_uppercase()));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(Digest::parse("abc").is_none());
        assert!(Digest::parse(&"g".repeat(64)).is_none());
    }

    #[test]
    fn serde_rejects_non_hex() {
        let err = serde_yaml::from_str::<Digest>("not-a-digest");
        assert!(err.is_err());
    }

    #[test]
    fn short_is_prefix() {
        let d = digest(b"x");
        assert!(d.as_str().starts_with(d.short()));
        assert_eq!(d.short().len(), 12);
    }
}
