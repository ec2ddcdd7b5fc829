//! Batch indexing orchestration.
//!
//! [`IndexBuilder`] loads the seeded catalog into a [`SearchIndex`] in fixed
//! size batches, so no single index call has to absorb the whole data set.
//! A failed batch aborts the build; there is no partially built index that
//! the service could start serving from.
//!
//! # Usage
//!
//! ```rust,ignore
//! use catalog_fts::{IndexBuilder, create_search_index};
//!
//! let index = create_search_index(&config.index)?;
//! let stats = IndexBuilder::new()
//!     .with_batch_size(config.batch_size)
//!     .build(index.as_ref(), &items)
//!     .await?;
//! println!("Indexed {} documents", stats.documents_indexed);
//! ```

use std::time::{Duration, Instant};

use catalog_core::{Error, Item, Result};

use crate::backend::SearchIndex;
use crate::document::ProductDocument;

/// Documents per batch when none is configured.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Statistics about an indexing operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexStats {
    /// Number of documents successfully indexed.
    pub documents_indexed: usize,
    /// Number of batches committed.
    pub batches: usize,
    /// Wall-clock time of the build.
    pub elapsed: Duration,
}

/// Batch index builder.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    batch_size: usize,
}

impl IndexBuilder {
    /// Create a builder with the default batch size.
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the number of documents per batch. Zero is treated as one.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Configured batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Index every item, one batch at a time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Startup`] naming the failed batch if the index rejects
    /// it. Batches committed before the failure are left in place.
    pub async fn build(&self, index: &dyn SearchIndex, items: &[Item]) -> Result<IndexStats> {
        let started = Instant::now();
        let total_batches = items.len().div_ceil(self.batch_size);
        let mut stats = IndexStats::default();

        log::info!(
            "Building {} index: {} documents in {} batches",
            index.name(),
            items.len(),
            total_batches
        );

        for (n, chunk) in items.chunks(self.batch_size).enumerate() {
            let docs: Vec<ProductDocument> = chunk.iter().map(ProductDocument::from).collect();

            index.insert_batch(&docs).await.map_err(|e| {
                Error::startup(format!(
                    "Failed to index batch {}/{}: {e}",
                    n + 1,
                    total_batches
                ))
            })?;

            stats.documents_indexed += docs.len();
            stats.batches += 1;
            log::debug!(
                "Indexed batch {}/{} ({} documents so far)",
                n + 1,
                total_batches,
                stats.documents_indexed
            );
        }

        stats.elapsed = started.elapsed();
        log::info!(
            "Indexed {} documents in {:?}",
            stats.documents_indexed,
            stats.elapsed
        );
        Ok(stats)
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
