//! Tantivy search backend implementation.
//!
//! Provides `TantivyIndex`, an in-RAM full-text index with BM25 ranking over
//! item names. Writes go through a single [`Indexer`] behind a mutex; every
//! write commits and reloads the reader before returning, so a query issued
//! after a successful upsert always sees it.

use std::sync::Mutex;

use async_trait::async_trait;
use catalog_core::{Error, IndexConfig, ItemId, Result};
use tantivy::collector::TopDocs;
use tantivy::schema::Value;
use tantivy::{IndexReader, ReloadPolicy, TantivyDocument};

use crate::backend::SearchIndex;
use crate::document::ProductDocument;
use crate::indexer::Indexer;
use crate::query::QueryBuilder;
use crate::schema::ProductSchema;
use crate::stopwords::StopwordFilter;

/// Tantivy-based search index.
pub struct TantivyIndex {
    indexer: Mutex<Option<Indexer>>,
    reader: IndexReader,
    schema: ProductSchema,
    query_builder: QueryBuilder,
}

impl TantivyIndex {
    /// Create an empty in-memory index.
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let schema = ProductSchema::build();
        let stopwords = StopwordFilter::new(config);
        let indexer = Indexer::new_in_memory(&schema, config.writer_memory_bytes, &stopwords)?;

        let reader = indexer
            .index()
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| Error::index(format!("Failed to open index reader: {e}")))?;

        let analyzer = indexer
            .index()
            .tokenizer_for_field(schema.name)
            .map_err(|e| Error::index(format!("Missing name analyzer: {e}")))?;
        let query_builder = QueryBuilder::new(schema.name, analyzer);

        Ok(Self {
            indexer: Mutex::new(Some(indexer)),
            reader,
            schema,
            query_builder,
        })
    }

    /// Run `stage` against the writer, then commit and refresh the reader.
    ///
    /// If staging or committing fails, staged changes are rolled back so the
    /// next write does not commit them by accident.
    fn write<F>(&self, stage: F) -> Result<()>
    where
        F: FnOnce(&mut Indexer) -> Result<()>,
    {
        let mut guard = self
            .indexer
            .lock()
            .map_err(|_| Error::index("index writer lock poisoned"))?;
        let indexer = guard
            .as_mut()
            .ok_or_else(|| Error::index("index is closed"))?;

        if let Err(e) = stage(indexer).and_then(|()| indexer.commit()) {
            if let Err(rollback_err) = indexer.rollback() {
                log::error!("Index rollback failed after '{e}': {rollback_err}");
            }
            return Err(e);
        }

        self.reader
            .reload()
            .map_err(|e| Error::index(format!("Failed to reload index reader: {e}")))
    }

    fn search_ids(&self, text: &str, limit: usize, offset: usize) -> Result<Vec<ItemId>> {
        let Some(query) = self.query_builder.build(text) else {
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let hits = searcher
            .search(&query, &TopDocs::with_limit(limit).and_offset(offset))
            .map_err(|e| Error::index(format!("Search failed: {e}")))?;

        let mut ids = Vec::with_capacity(hits.len());
        for (_score, address) in hits {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| Error::index(format!("Failed to load document: {e}")))?;
            match doc.get_first(self.schema.id).and_then(|v| v.as_u64()) {
                Some(id) => ids.push(id),
                None => log::warn!("Skipping index hit without an id at {address:?}"),
            }
        }
        Ok(ids)
    }
}

#[async_trait]
impl SearchIndex for TantivyIndex {
    async fn upsert(&self, doc: &ProductDocument) -> Result<()> {
        self.write(|indexer| indexer.upsert(doc))
    }

    async fn delete(&self, id: ItemId) -> Result<()> {
        self.write(|indexer| {
            indexer.delete(id);
            Ok(())
        })
    }

    async fn query(&self, text: &str, limit: usize, offset: usize) -> Result<Vec<ItemId>> {
        self.search_ids(text, limit, offset)
    }

    async fn insert_batch(&self, docs: &[ProductDocument]) -> Result<()> {
        self.write(|indexer| docs.iter().try_for_each(|doc| indexer.upsert(doc)))
    }

    async fn doc_count(&self) -> Result<u64> {
        Ok(self.reader.searcher().num_docs())
    }

    async fn close(&self) -> Result<()> {
        let indexer = self
            .indexer
            .lock()
            .map_err(|_| Error::index("index writer lock poisoned"))?
            .take();
        if indexer.is_some() {
            log::info!("Tantivy index released");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "tantivy"
    }
}

impl std::fmt::Debug for TantivyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivyIndex")
            .field("documents", &self.reader.searcher().num_docs())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
