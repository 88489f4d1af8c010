//! Chat word filter for `packsync-filter`.
//!
//! [`WordFilter::check_message`] returns the message untouched unless one of
//! its whitespace-delimited tokens is on the banned list (compared
//! case-insensitively), in which case the fixed [`REMOVAL_NOTICE`] is
//! returned instead. The list is read from a YAML document:
//!
//! ```yaml
//! censored_words:
//!   - spam
//!   - scam
//! ```
//!
//! A missing file, a missing key or malformed YAML all leave the filter empty
//! (every message passes); [`WordFilter::load`] logs the reason and carries on.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Returned in place of a message that contains a banned word.
pub const REMOVAL_NOTICE: &str = "Your message was removed because it contains a prohibited word.";

/// The one recognised key in the word-list document.
pub const WORDS_KEY: &str = "censored_words";

/// Errors from reading the word list. None of them are fatal to callers of
/// [`WordFilter::load`].
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("word list not found at {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse word list at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no `{WORDS_KEY}` key in {path}")]
    MissingKey { path: PathBuf },
}

#[derive(Debug, Default, Deserialize)]
struct WordList {
    #[serde(default)]
    censored_words: Option<Vec<String>>,
}

/// Static banned-word set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFilter {
    banned: HashSet<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl WordFilter {
    /// Build from an explicit word list.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let banned = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { banned }
    }

    /// Read the word list at `path`.
    pub fn try_load(path: &Path) -> Result<Self, FilterError> {
        if !path.exists() {
            return Err(FilterError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|source| FilterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let list: WordList = if contents.trim().is_empty() {
            WordList::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|source| FilterError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };
        let words = list.censored_words.ok_or_else(|| FilterError::MissingKey {
            path: path.to_path_buf(),
        })?;
        Ok(Self::new(words))
    }

    /// Read the word list at `path`, falling back to an empty filter.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(filter) => {
                tracing::info!("loaded {} censored words", filter.len());
                filter
            }
            Err(e) => {
                tracing::warn!("{e}; chat filter disabled");
                Self::default()
            }
        }
    }

    /// Filter one chat message from `author`: either `message` itself or
    /// [`REMOVAL_NOTICE`].
    pub fn check_message<'a>(&self, message: &'a str, author: &str) -> &'a str {
        if message.split_whitespace().any(|word| self.is_banned(word)) {
            tracing::info!("message from {author} contains censored words and has been removed");
            return REMOVAL_NOTICE;
        }
        message
    }

    pub fn is_banned(&self, word: &str) -> bool {
        !self.banned.is_empty() && self.banned.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.banned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banned.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banned_word_replaces_message() {
        let f = WordFilter::new(["spam"]);
        assert_eq!(f.check_message("buy spam now", "steve"), REMOVAL_NOTICE);
    }

    #[test]
    fn clean_message_is_returned_unchanged() {
        let f = WordFilter::new(["spam"]);
        let msg = "buy good stuff";
        let out = f.check_message(msg, "steve");
        assert!(std::ptr::eq(out, msg));
    }

    #[test]
    fn substrings_do_not_match() {
        let f = WordFilter::new(["spam"]);
        assert_eq!(f.check_message("spammer spamming", "alex"), "spammer spamming");
    }

    #[test]
    fn empty_filter_passes_everything() {
        let f = WordFilter::default();
        assert!(f.is_empty());
        assert_eq!(f.check_message("spam", "alex"), "spam");
    }

    #[test]
    fn blank_entries_are_dropped() {
        let f = WordFilter::new(["", "  ", "Scam "]);
        assert_eq!(f.len(), 1);
        assert!(f.is_banned("SCAM"));
    }
}
