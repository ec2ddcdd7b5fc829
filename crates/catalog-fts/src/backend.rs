//! Search index trait and factory.
//!
//! This module defines the `SearchIndex` trait that every index backend must
//! satisfy. The catalog is the source of truth; an index only answers "which
//! ids match this text, best first".
//!
//! # Backends
//!
//! - `TantivyIndex`: In-RAM full-text index with BM25 ranking
//! - `SimpleIndex`: Linear scan fallback for small collections
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_core::IndexConfig;
//! use catalog_fts::create_search_index;
//!
//! let index = create_search_index(&IndexConfig::default())?;
//! let ids = index.query("yoga mat", 50, 0).await?;
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use catalog_core::{Error, IndexConfig, ItemId, Result};
use tantivy::tokenizer::TextAnalyzer;

use crate::document::ProductDocument;
use crate::schema::{analyze, standard_analyzer};
use crate::stopwords::StopwordFilter;
use crate::tantivy_index::TantivyIndex;

/// Abstract search index.
///
/// Implementations must be safe for concurrent use; callers coordinate
/// ordering, not mutual exclusion. A successful `upsert` or `delete` is
/// visible to every `query` that starts after it returns.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert or replace the document keyed by `doc.id`.
    async fn upsert(&self, doc: &ProductDocument) -> Result<()>;

    /// Remove the document with this id. Removing an absent id succeeds.
    async fn delete(&self, id: ItemId) -> Result<()>;

    /// Return up to `limit` matching ids, best first, skipping `offset` hits.
    async fn query(&self, text: &str, limit: usize, offset: usize) -> Result<Vec<ItemId>>;

    /// Insert a batch of documents, visible together once this returns.
    ///
    /// The default upserts one document at a time.
    async fn insert_batch(&self, docs: &[ProductDocument]) -> Result<()> {
        for doc in docs {
            self.upsert(doc).await?;
        }
        Ok(())
    }

    /// Number of searchable documents.
    async fn doc_count(&self) -> Result<u64>;

    /// Release resources. Later calls may fail.
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Get the backend name for diagnostics.
    fn name(&self) -> &str;
}

/// Create a search index based on configuration.
///
/// # Errors
///
/// Returns a configuration error for an unknown backend, or an index error if
/// the backend cannot be initialized.
pub fn create_search_index(config: &IndexConfig) -> Result<Arc<dyn SearchIndex>> {
    match config.backend.as_str() {
        "tantivy" => Ok(Arc::new(TantivyIndex::new(config)?)),
        "simple" => Ok(Arc::new(SimpleIndex::with_stopwords(
            &StopwordFilter::new(config),
        ))),
        other => Err(Error::config(format!("unknown index backend '{other}'"))),
    }
}

/// Simple linear-scan search backend.
///
/// Keeps analyzed names in memory and scores each document by how many
/// distinct query terms its name contains, normalized by name length. Ties
/// go to the lower id.
///
/// # Limitations
///
/// - O(n) query time
/// - No inverse-document-frequency weighting
pub struct SimpleIndex {
    docs: RwLock<BTreeMap<ItemId, SimpleEntry>>,
    analyzer: TextAnalyzer,
}

struct SimpleEntry {
    terms: Vec<String>,
}

impl SimpleIndex {
    /// Create an empty simple index with the default stopword list.
    pub fn new() -> Self {
        Self::with_stopwords(&StopwordFilter::default())
    }

    /// Create an empty simple index that drops the given stopwords.
    pub fn with_stopwords(stopwords: &StopwordFilter) -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
            analyzer: standard_analyzer(stopwords),
        }
    }

    fn terms_of(&self, text: &str) -> Vec<String> {
        let mut analyzer = self.analyzer.clone();
        let mut terms = analyze(&mut analyzer, text);
        terms.sort();
        terms.dedup();
        terms
    }

    fn entry(&self, doc: &ProductDocument) -> SimpleEntry {
        SimpleEntry {
            terms: self.terms_of(&doc.name),
        }
    }

    fn write_docs(&self) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<ItemId, SimpleEntry>>> {
        self.docs
            .write()
            .map_err(|_| Error::index("simple index lock poisoned"))
    }

    fn read_docs(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<ItemId, SimpleEntry>>> {
        self.docs
            .read()
            .map_err(|_| Error::index("simple index lock poisoned"))
    }
}

impl Default for SimpleIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchIndex for SimpleIndex {
    async fn upsert(&self, doc: &ProductDocument) -> Result<()> {
        let entry = self.entry(doc);
        self.write_docs()?.insert(doc.id, entry);
        Ok(())
    }

    async fn delete(&self, id: ItemId) -> Result<()> {
        self.write_docs()?.remove(&id);
        Ok(())
    }

    async fn query(&self, text: &str, limit: usize, offset: usize) -> Result<Vec<ItemId>> {
        let query_terms = self.terms_of(text);
        if query_terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let docs = self.read_docs()?;
        let mut scored: Vec<(f32, ItemId)> = docs
            .iter()
            .filter_map(|(id, entry)| {
                let matched = query_terms
                    .iter()
                    .filter(|t| entry.terms.binary_search(t).is_ok())
                    .count();
                if matched == 0 {
                    return None;
                }
                let score = matched as f32 / (entry.terms.len() as f32).sqrt();
                Some((score, *id))
            })
            .collect();
        drop(docs);

        // Highest score first; BTreeMap iteration already put ids in order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        log::debug!(
            "SimpleIndex: query='{}', matches={}, limit={}",
            text,
            scored.len(),
            limit
        );

        Ok(scored
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, id)| id)
            .collect())
    }

    async fn insert_batch(&self, docs: &[ProductDocument]) -> Result<()> {
        let entries: Vec<(ItemId, SimpleEntry)> =
            docs.iter().map(|doc| (doc.id, self.entry(doc))).collect();
        self.write_docs()?.extend(entries);
        Ok(())
    }

    async fn doc_count(&self) -> Result<u64> {
        Ok(self.read_docs()?.len() as u64)
    }

    fn name(&self) -> &str {
        "simple"
    }
}

impl std::fmt::Debug for SimpleIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.docs.read().map(|d| d.len()).unwrap_or_default();
        f.debug_struct("SimpleIndex")
            .field("documents", &count)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
