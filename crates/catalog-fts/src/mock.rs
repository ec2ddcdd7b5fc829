//! Fault injection for search indexes.
//!
//! [`FaultyIndex`] wraps a real backend and fails selected operations on
//! demand. It is used to exercise rollback and error paths deterministically.
//! Only compiled for this crate's tests or with the `testing` feature.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use catalog_core::{Error, ItemId, Result};

use crate::backend::SearchIndex;
use crate::document::ProductDocument;

/// A search index that fails operations while the matching switch is on.
pub struct FaultyIndex {
    inner: Arc<dyn SearchIndex>,
    fail_upsert: AtomicBool,
    fail_delete: AtomicBool,
    fail_query: AtomicBool,
    fail_batch: AtomicBool,
}

impl FaultyIndex {
    /// Wrap `inner` with every switch off.
    pub fn new(inner: Arc<dyn SearchIndex>) -> Self {
        Self {
            inner,
            fail_upsert: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_query: AtomicBool::new(false),
            fail_batch: AtomicBool::new(false),
        }
    }

    /// Start with upserts failing.
    pub fn failing_upserts(self) -> Self {
        self.set_fail_upsert(true);
        self
    }

    /// Start with deletes failing.
    pub fn failing_deletes(self) -> Self {
        self.set_fail_delete(true);
        self
    }

    /// Start with queries failing.
    pub fn failing_queries(self) -> Self {
        self.set_fail_query(true);
        self
    }

    /// Start with batch inserts failing.
    pub fn failing_batches(self) -> Self {
        self.set_fail_batch(true);
        self
    }

    /// Toggle upsert failures.
    pub fn set_fail_upsert(&self, fail: bool) {
        self.fail_upsert.store(fail, Ordering::SeqCst);
    }

    /// Toggle delete failures.
    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Toggle query failures.
    pub fn set_fail_query(&self, fail: bool) {
        self.fail_query.store(fail, Ordering::SeqCst);
    }

    /// Toggle batch insert failures.
    pub fn set_fail_batch(&self, fail: bool) {
        self.fail_batch.store(fail, Ordering::SeqCst);
    }

    /// The wrapped index.
    pub fn inner(&self) -> &Arc<dyn SearchIndex> {
        &self.inner
    }

    fn check(flag: &AtomicBool, op: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(Error::index(format!("injected {op} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for FaultyIndex {
    async fn upsert(&self, doc: &ProductDocument) -> Result<()> {
        Self::check(&self.fail_upsert, "upsert")?;
        self.inner.upsert(doc).await
    }

    async fn delete(&self, id: ItemId) -> Result<()> {
        Self::check(&self.fail_delete, "delete")?;
        self.inner.delete(id).await
    }

    async fn query(&self, text: &str, limit: usize, offset: usize) -> Result<Vec<ItemId>> {
        Self::check(&self.fail_query, "query")?;
        self.inner.query(text, limit, offset).await
    }

    async fn insert_batch(&self, docs: &[ProductDocument]) -> Result<()> {
        Self::check(&self.fail_batch, "batch")?;
        self.inner.insert_batch(docs).await
    }

    async fn doc_count(&self) -> Result<u64> {
        self.inner.doc_count().await
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl std::fmt::Debug for FaultyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultyIndex")
            .field("inner", &self.inner.name())
            .field("fail_upsert", &self.fail_upsert.load(Ordering::SeqCst))
            .field("fail_delete", &self.fail_delete.load(Ordering::SeqCst))
            .field("fail_query", &self.fail_query.load(Ordering::SeqCst))
            .field("fail_batch", &self.fail_batch.load(Ordering::SeqCst))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
