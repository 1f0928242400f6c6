//! Regex filtering of catalog entries by display name.

use crate::volumio_client::CatalogEntry;
use regex::Regex;

/// A compiled episode pattern.
///
/// Matching is unanchored: `ASOT` matches "Best of ASOT 2020". Patterns that
/// need to match from the start must say so with `^`.
#[derive(Debug, Clone)]
pub struct EpisodePattern {
    regex: Regex,
}

impl EpisodePattern {
    /// Compiles `pattern` once.
    ///
    /// # Errors
    ///
    /// Returns the regex error when `pattern` is not a valid regular expression.
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        self.regex.is_match(entry.display_name())
    }

    /// Keeps the entries whose display name matches, in their original order.
    ///
    /// No matches is a valid (empty) result.
    pub fn filter(&self, entries: &[CatalogEntry]) -> Vec<CatalogEntry> {
        entries
            .iter()
            .filter(|entry| self.matches(entry))
            .cloned()
            .collect()
    }
}
