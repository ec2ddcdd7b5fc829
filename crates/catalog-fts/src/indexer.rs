//! Tantivy index writer wrapper.
//!
//! [`Indexer`] owns the in-RAM Tantivy index and its single `IndexWriter`,
//! and converts [`ProductDocument`]s into Tantivy documents. Every write is
//! keyed by the `id` term, so adding a document that already exists replaces
//! it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use catalog_fts::{Indexer, ProductDocument, ProductSchema, StopwordFilter};
//!
//! let schema = ProductSchema::build();
//! let mut indexer = Indexer::new_in_memory(&schema, 50_000_000, &StopwordFilter::default())?;
//!
//! indexer.upsert(&ProductDocument::new(1, "Wireless Mouse 1", "Electronics"))?;
//! indexer.commit()?;
//! ```

use catalog_core::{Error, ItemId, Result};
use tantivy::{Index, IndexWriter, TantivyDocument, Term};

use crate::document::ProductDocument;
use crate::schema::ProductSchema;
use crate::stopwords::StopwordFilter;

/// Smallest writer budget Tantivy accepts for a single indexing thread.
pub const MIN_WRITER_MEMORY: usize = 15_000_000;

/// Tantivy index writer wrapper.
pub struct Indexer {
    index: Index,
    writer: IndexWriter,
    schema: ProductSchema,
}

impl Indexer {
    /// Create an in-memory index with a single-threaded writer.
    pub fn new_in_memory(
        schema: &ProductSchema,
        writer_memory: usize,
        stopwords: &StopwordFilter,
    ) -> Result<Self> {
        let index = Index::create_in_ram(schema.schema().clone());
        ProductSchema::register_tokenizers(&index, stopwords);

        let writer = index
            .writer_with_num_threads(1, writer_memory.max(MIN_WRITER_MEMORY))
            .map_err(|e| Error::index(format!("Failed to create index writer: {e}")))?;

        Ok(Self {
            index,
            writer,
            schema: schema.clone(),
        })
    }

    /// Stage a document, replacing any staged or committed one with the same id.
    ///
    /// Not searchable until `commit()` is called.
    pub fn upsert(&mut self, doc: &ProductDocument) -> Result<()> {
        self.writer.delete_term(self.id_term(doc.id));
        self.writer
            .add_document(self.convert_to_tantivy_doc(doc))
            .map_err(|e| Error::index(format!("Failed to add document {}: {e}", doc.id)))?;
        Ok(())
    }

    /// Stage the removal of a document. Unknown ids are a no-op.
    pub fn delete(&mut self, id: ItemId) {
        self.writer.delete_term(self.id_term(id));
    }

    /// Commit staged changes to make them searchable.
    pub fn commit(&mut self) -> Result<()> {
        self.writer
            .commit()
            .map_err(|e| Error::index(format!("Failed to commit index: {e}")))?;
        Ok(())
    }

    /// Drop staged changes that have not been committed.
    pub fn rollback(&mut self) -> Result<()> {
        self.writer
            .rollback()
            .map_err(|e| Error::index(format!("Failed to roll back index writer: {e}")))?;
        Ok(())
    }

    /// Get reference to the underlying Tantivy index.
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Get the schema.
    pub fn schema(&self) -> &ProductSchema {
        &self.schema
    }

    fn id_term(&self, id: ItemId) -> Term {
        Term::from_field_u64(self.schema.id, id)
    }

    fn convert_to_tantivy_doc(&self, doc: &ProductDocument) -> TantivyDocument {
        let s = &self.schema;

        let mut tantivy_doc = TantivyDocument::new();
        tantivy_doc.add_u64(s.id, doc.id);
        tantivy_doc.add_text(s.name, &doc.name);
        tantivy_doc.add_text(s.category, &doc.category);
        tantivy_doc
    }
}

impl std::fmt::Debug for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer")
            .field("index", &"<tantivy::Index>")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
