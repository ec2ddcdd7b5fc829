//! Full-text index capability for the catalog.
//!
//! The catalog treats text matching as an external capability. This crate
//! defines that capability as the [`SearchIndex`] trait and ships two
//! implementations of it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      catalog-fts                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SearchIndex trait (upsert / delete / query / batch)        │
//! │  ├── TantivyIndex (in-RAM full-text index, BM25)            │
//! │  └── SimpleIndex  (linear scan fallback)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ProductSchema (id, name, category)                         │
//! │  ProductDocument (indexed document representation)         │
//! │  QueryBuilder (match query over `name`)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Indexer (Tantivy index writer)                             │
//! │  IndexBuilder (batched bulk load)                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Schema
//!
//! | Field | Type | Purpose |
//! |-------|------|---------|
//! | `id` | U64 (indexed, stored, fast) | Catalog identifier, delete key |
//! | `name` | TEXT (`standard` analyzer) | The only matchable field |
//! | `category` | STORED | Carried along, never matched |
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_fts::{ProductDocument, create_search_index};
//!
//! let index = create_search_index(&config.index)?;
//! index.upsert(&ProductDocument::new(7, "Wireless Mouse 7", "Electronics")).await?;
//!
//! let ids = index.query("wireless mouse", 50, 0).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod builder;
pub mod document;
pub mod indexer;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod query;
pub mod schema;
pub mod stopwords;
pub mod tantivy_index;

// Re-exports
pub use backend::{SearchIndex, SimpleIndex, create_search_index};
pub use builder::{IndexBuilder, IndexStats};
pub use document::ProductDocument;
pub use indexer::Indexer;
#[cfg(any(test, feature = "testing"))]
pub use mock::FaultyIndex;
pub use query::QueryBuilder;
pub use schema::ProductSchema;
pub use stopwords::StopwordFilter;
pub use tantivy_index::TantivyIndex;
