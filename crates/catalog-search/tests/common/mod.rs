//! Common test utilities and harness for coordinator integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use catalog_core::{Catalog, Error, IndexConfig, ItemId, Result};
use catalog_fts::{FaultyIndex, ProductDocument, SearchIndex, SimpleIndex, TantivyIndex};
use catalog_search::SearchCoordinator;
use tokio::sync::Notify;

/// Batch size used by the harness; small enough to exercise several batches.
pub const TEST_BATCH_SIZE: usize = 64;

/// Bootstrap a coordinator over `index` with `seed` generated items.
pub async fn ready_coordinator(index: Arc<dyn SearchIndex>, seed: usize) -> SearchCoordinator {
    let coordinator = SearchCoordinator::new(Arc::new(Catalog::new()), index);
    coordinator
        .bootstrap(seed, TEST_BATCH_SIZE)
        .await
        .expect("bootstrap should succeed");
    coordinator
}

/// Coordinator over the linear-scan backend.
pub async fn simple(seed: usize) -> SearchCoordinator {
    ready_coordinator(Arc::new(SimpleIndex::new()), seed).await
}

/// Coordinator over the Tantivy backend.
pub async fn tantivy(seed: usize) -> SearchCoordinator {
    let index = TantivyIndex::new(&IndexConfig::default()).expect("tantivy index");
    ready_coordinator(Arc::new(index), seed).await
}

/// Coordinator whose index fails on demand.
pub async fn faulty(seed: usize) -> (SearchCoordinator, Arc<FaultyIndex>) {
    let index = Arc::new(FaultyIndex::new(Arc::new(SimpleIndex::new())));
    let coordinator = ready_coordinator(index.clone(), seed).await;
    (coordinator, index)
}

/// Coordinator whose index can park inside a write.
pub async fn gated(seed: usize) -> (SearchCoordinator, Arc<GatedIndex>) {
    let index = Arc::new(GatedIndex::new());
    let coordinator = ready_coordinator(index.clone(), seed).await;
    (coordinator, index)
}

/// Poll `condition` until it holds, panicking after a couple of seconds.
pub async fn eventually<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

/// A search index that parks inside its next gated call until released.
///
/// The write is applied to the inner index before parking, so a parked
/// upsert is already visible to index queries. That is the widest window a
/// concurrent reader can hit.
pub struct GatedIndex {
    inner: SimpleIndex,
    gate_upsert: AtomicBool,
    gate_delete: AtomicBool,
    gate_batch: AtomicBool,
    gate_close: AtomicBool,
    fail_after_gate: AtomicBool,
    entered: Notify,
    release: Notify,
}

impl GatedIndex {
    pub fn new() -> Self {
        Self {
            inner: SimpleIndex::new(),
            gate_upsert: AtomicBool::new(false),
            gate_delete: AtomicBool::new(false),
            gate_batch: AtomicBool::new(false),
            gate_close: AtomicBool::new(false),
            fail_after_gate: AtomicBool::new(false),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    /// Park the next upsert.
    pub fn gate_next_upsert(&self) {
        self.gate_upsert.store(true, Ordering::SeqCst);
    }

    /// Park the next delete.
    pub fn gate_next_delete(&self) {
        self.gate_delete.store(true, Ordering::SeqCst);
    }

    /// Park the next batch insert.
    pub fn gate_next_batch(&self) {
        self.gate_batch.store(true, Ordering::SeqCst);
    }

    /// Park the next close.
    pub fn gate_next_close(&self) {
        self.gate_close.store(true, Ordering::SeqCst);
    }

    /// Make the gated write report failure once released.
    pub fn fail_after_gate(&self) {
        self.fail_after_gate.store(true, Ordering::SeqCst);
    }

    /// Wait until a write is parked.
    pub async fn wait_parked(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.entered.notified())
            .await
            .expect("a write should park");
    }

    /// Let the parked write finish.
    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn park(&self, gate: &AtomicBool) -> Result<()> {
        if !gate.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.entered.notify_one();
        self.release.notified().await;
        if self.fail_after_gate.swap(false, Ordering::SeqCst) {
            return Err(Error::index("injected failure after gate"));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for GatedIndex {
    async fn upsert(&self, doc: &ProductDocument) -> Result<()> {
        self.inner.upsert(doc).await?;
        self.park(&self.gate_upsert).await
    }

    async fn delete(&self, id: ItemId) -> Result<()> {
        self.inner.delete(id).await?;
        self.park(&self.gate_delete).await
    }

    async fn query(&self, text: &str, limit: usize, offset: usize) -> Result<Vec<ItemId>> {
        self.inner.query(text, limit, offset).await
    }

    async fn insert_batch(&self, docs: &[ProductDocument]) -> Result<()> {
        self.inner.insert_batch(docs).await?;
        self.park(&self.gate_batch).await
    }

    async fn doc_count(&self) -> Result<u64> {
        self.inner.doc_count().await
    }

    async fn close(&self) -> Result<()> {
        self.park(&self.gate_close).await
    }

    fn name(&self) -> &str {
        "gated"
    }
}
