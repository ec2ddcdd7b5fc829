//! English stopword list for name analysis.
//!
//! The `standard` analyzer drops common English words so that a query like
//! "mat for yoga" matches on "mat" and "yoga" only. The list comes from the
//! `stop-words` crate and supports:
//!
//! - Allowlist: words kept searchable even if they are stopwords
//! - Custom stopwords: additional words to drop
//! - Disabling the filter entirely
//!
//! Entries containing digits are always excluded: item names end in their
//! sequence number and those numerals must stay searchable.
//!
//! # Example
//!
//! ```rust
//! use catalog_core::IndexConfig;
//! use catalog_fts::stopwords::StopwordFilter;
//!
//! let config = IndexConfig {
//!     stopword_allowlist: vec!["Over".to_string()],
//!     ..Default::default()
//! };
//! let filter = StopwordFilter::new(&config);
//! assert!(filter.is_stopword("the"));
//! assert!(!filter.is_stopword("over"));
//! assert!(!filter.is_stopword("42"));
//! ```

use std::collections::HashSet;

use catalog_core::IndexConfig;
use stop_words::{LANGUAGE, get};

/// Stopword set used during analysis.
#[derive(Clone)]
pub struct StopwordFilter {
    stopwords: HashSet<String>,
}

impl StopwordFilter {
    /// Build the filter from index configuration.
    pub fn new(config: &IndexConfig) -> Self {
        if !config.stopwords_enabled {
            return Self::disabled();
        }

        let allowlist: HashSet<String> = config
            .stopword_allowlist
            .iter()
            .map(|w| w.to_lowercase())
            .collect();

        let mut filter = Self::english();
        filter.stopwords.retain(|w| !allowlist.contains(w));
        filter
    }

    /// The full English list, minus entries that contain digits.
    pub fn english() -> Self {
        let stopwords = get(LANGUAGE::English)
            .iter()
            .map(|s| s.to_lowercase())
            .filter(|s| !s.is_empty() && !s.chars().any(|c| c.is_ascii_digit()))
            .collect();
        Self { stopwords }
    }

    /// A filter that treats nothing as a stopword.
    pub fn disabled() -> Self {
        Self {
            stopwords: HashSet::new(),
        }
    }

    /// Add extra stopwords.
    pub fn with_custom<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    /// Check if a word is a stopword (case-insensitive).
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    /// Number of stopwords in the set.
    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }

    /// The words, for Tantivy's token filter.
    pub fn words(&self) -> Vec<String> {
        self.stopwords.iter().cloned().collect()
    }
}

impl Default for StopwordFilter {
    fn default() -> Self {
        Self::new(&IndexConfig::default())
    }
}

impl std::fmt::Debug for StopwordFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopwordFilter")
            .field("stopword_count", &self.stopwords.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
