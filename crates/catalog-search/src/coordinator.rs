//! The search coordinator.
//!
//! [`SearchCoordinator`] is the only path through which the catalog is
//! mutated once the service is up. It pairs every catalog mutation with the
//! matching index update and answers searches by checking index hits against
//! the live catalog.
//!
//! # Ordering
//!
//! - **Create** holds the catalog's exclusive section across insert, index
//!   upsert and, on failure, the compensating removal. No reader can observe
//!   an item that is present but not yet indexed, and no writer interleaves
//!   with a rollback.
//! - **Delete** removes from the catalog first and releases the lock before
//!   asking the index to forget the id. If the index refuses, the catalog
//!   removal stands; searches filter by catalog membership, so the stale
//!   index entry is never returned.
//! - **Search** queries the index, then resolves candidates under a shared
//!   lock, preserving index order and skipping ids the catalog does not hold.
//!
//! Mutations run to completion in their own task, so a caller that gives up
//! (client disconnect, timeout) never leaves a half-applied create or delete.
//! Each one holds a drain permit; [`SearchCoordinator::shutdown`] waits for
//! every permit before releasing the index.

use std::future::Future;
use std::sync::Arc;

use catalog_core::{
    Catalog, CatalogConfig, Error, Item, ItemId, MAX_RESULTS, NewItem, Result, ServiceHandle,
    ServiceState,
};
use catalog_fts::{IndexBuilder, IndexStats, ProductDocument, SearchIndex, create_search_index};
use serde::Serialize;
use tokio::sync::{OnceCell, OwnedSemaphorePermit, Semaphore};

/// Upper bound on concurrently running mutations.
///
/// Shutdown drains by acquiring all of them at once.
pub const DRAIN_PERMITS: u32 = 1 << 16;

/// Coordinates the catalog and its search index.
///
/// Cheap to clone; clones share the same catalog, index and lifecycle.
#[derive(Clone)]
pub struct SearchCoordinator {
    inner: Arc<Inner>,
    max_results: usize,
}

struct Inner {
    catalog: Arc<Catalog>,
    index: Arc<dyn SearchIndex>,
    service: ServiceHandle,
    in_flight: Arc<Semaphore>,
    // Outcome of the one shutdown that ran to completion
    stopped: OnceCell<std::result::Result<(), String>>,
}

/// Point-in-time view of the coordinator for health reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    /// Lifecycle state, e.g. `ready` or `stopping`.
    pub status: String,
    /// Items currently in the catalog.
    pub items: usize,
    /// Index backend name.
    pub backend: String,
    /// Mutations currently running.
    pub in_flight: usize,
}

impl HealthReport {
    /// Whether the coordinator reported itself ready.
    pub fn is_ready(&self) -> bool {
        self.status == ServiceState::Ready.to_string()
    }
}

impl SearchCoordinator {
    /// Create a coordinator over an existing catalog and index.
    ///
    /// The coordinator starts `Stopped`; call [`bootstrap`](Self::bootstrap)
    /// (or [`bulk_load`](Self::bulk_load)) before serving traffic.
    pub fn new(catalog: Arc<Catalog>, index: Arc<dyn SearchIndex>) -> Self {
        Self {
            inner: Arc::new(Inner {
                catalog,
                index,
                service: ServiceHandle::new("catalog"),
                in_flight: Arc::new(Semaphore::new(DRAIN_PERMITS as usize)),
                stopped: OnceCell::new(),
            }),
            max_results: MAX_RESULTS,
        }
    }

    /// Build an empty catalog and the configured index backend.
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let index = create_search_index(&config.index)?;
        Ok(Self::new(Arc::new(Catalog::new()), index).with_max_results(config.max_results))
    }

    /// Cap search results at `max` (never above [`MAX_RESULTS`]).
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max.clamp(1, MAX_RESULTS);
        self
    }

    /// The lifecycle handle.
    pub fn service(&self) -> &ServiceHandle {
        &self.inner.service
    }

    /// The underlying catalog.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.inner.catalog
    }

    /// The underlying index.
    pub fn index(&self) -> &Arc<dyn SearchIndex> {
        &self.inner.index
    }

    /// Effective result cap.
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Seed the catalog with `seed_count` items and index them.
    ///
    /// Moves the service `Stopped → Starting → Ready`. Any failure moves it
    /// to `Failed` and is returned as [`Error::Startup`]; the coordinator
    /// never becomes ready over a partial index.
    pub async fn bootstrap(&self, seed_count: usize, batch_size: usize) -> Result<IndexStats> {
        self.begin_startup()?;

        let result = match self.inner.catalog.seed(seed_count).await {
            Ok(items) => self.build_index(&items, batch_size).await,
            Err(e) => Err(e),
        };
        self.finish_startup(result)
    }

    /// Index items that are already in the catalog, then become ready.
    ///
    /// For callers that populate the catalog themselves.
    pub async fn bulk_load(&self, items: &[Item], batch_size: usize) -> Result<IndexStats> {
        self.begin_startup()?;
        let result = self.build_index(items, batch_size).await;
        self.finish_startup(result)
    }

    fn begin_startup(&self) -> Result<()> {
        let service = &self.inner.service;
        if !service.transition(&ServiceState::Stopped, ServiceState::Starting) {
            return Err(Error::startup(format!(
                "cannot start while {}",
                service.state()
            )));
        }
        // A coordinator that has been shut down stays down
        if self.inner.in_flight.is_closed() {
            service.set_state(ServiceState::Stopped);
            return Err(Error::startup("coordinator has been shut down"));
        }
        Ok(())
    }

    /// Leave `Starting` for `Ready` or `Failed`, unless a shutdown got there first.
    fn finish_startup(&self, result: Result<IndexStats>) -> Result<IndexStats> {
        let service = &self.inner.service;
        match result {
            Ok(stats) => {
                if service.transition(&ServiceState::Starting, ServiceState::Ready) {
                    Ok(stats)
                } else {
                    let e = Error::startup(format!(
                        "interrupted by shutdown (service is {})",
                        service.state()
                    ));
                    log::warn!("{e}");
                    Err(e)
                }
            }
            Err(e) => {
                let e = match e {
                    Error::Startup(_) => e,
                    other => Error::startup(other.to_string()),
                };
                log::error!("{e}");
                service.transition(&ServiceState::Starting, ServiceState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn build_index(&self, items: &[Item], batch_size: usize) -> Result<IndexStats> {
        IndexBuilder::new()
            .with_batch_size(batch_size)
            .build(self.inner.index.as_ref(), items)
            .await
    }

    /// Store a new item and index its name.
    ///
    /// If the index rejects the upsert, the item is removed again before the
    /// catalog lock is released and the index error is returned: the create
    /// did not happen. The consumed identifier is not reused.
    pub async fn create(&self, item: NewItem) -> Result<Item> {
        let permit = self.admit().await?;
        let inner = Arc::clone(&self.inner);
        run_to_completion(async move {
            let _permit = permit;
            inner.create(item).await
        })
        .await
    }

    /// Remove an item from the catalog, then from the index.
    ///
    /// Returns [`Error::NotFound`] without touching the index if the item does
    /// not exist. If the index delete fails, the error is returned but the
    /// item stays removed from the catalog.
    pub async fn delete(&self, id: ItemId) -> Result<Item> {
        let permit = self.admit().await?;
        let inner = Arc::clone(&self.inner);
        run_to_completion(async move {
            let _permit = permit;
            inner.delete(id).await
        })
        .await
    }

    /// Look up a single item.
    pub async fn get(&self, id: ItemId) -> Result<Item> {
        self.inner.service.ensure_ready()?;
        self.inner.catalog.get(id).await
    }

    /// Search item names, best match first, at most [`max_results`](Self::max_results).
    ///
    /// Text that contains no searchable terms yields an empty result.
    pub async fn search(&self, text: &str) -> Result<Vec<Item>> {
        self.inner.service.ensure_ready()?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let limit = self.max_results;
        let candidates = self.inner.index.query(text, limit, 0).await.map_err(|e| {
            log::error!("Index query '{text}' failed: {e}");
            e
        })?;

        let catalog = self.inner.catalog.read().await;
        let results: Vec<Item> = candidates
            .iter()
            .filter_map(|id| catalog.get(*id).cloned())
            .take(limit)
            .collect();
        drop(catalog);

        if results.len() < candidates.len() {
            log::debug!(
                "Search '{text}': skipped {} candidates missing from the catalog",
                candidates.len() - results.len()
            );
        }
        Ok(results)
    }

    /// Current lifecycle state, catalog size and backend.
    pub async fn health(&self) -> HealthReport {
        HealthReport {
            status: self.inner.service.state().to_string(),
            items: self.inner.catalog.len().await,
            backend: self.inner.index.name().to_string(),
            in_flight: self.in_flight(),
        }
    }

    /// Number of mutations currently running.
    pub fn in_flight(&self) -> usize {
        if self.inner.in_flight.is_closed() {
            return 0;
        }
        (DRAIN_PERMITS as usize).saturating_sub(self.inner.in_flight.available_permits())
    }

    /// Stop accepting requests, wait for running mutations, release the index.
    ///
    /// Safe to call more than once and from several tasks at once: every
    /// caller returns only after the index has been released, with the same
    /// outcome. A shutdown during startup wins; the coordinator never becomes
    /// ready afterwards. Callers bound the wait with their own timeout; a
    /// timed-out call leaves the coordinator `Stopping` and can be retried.
    pub async fn shutdown(&self) -> Result<()> {
        let inner = &self.inner;
        let outcome = inner
            .stopped
            .get_or_init(|| async move {
                if inner.service.state() != ServiceState::Stopping {
                    inner.service.set_state(ServiceState::Stopping);
                }

                if let Ok(drained) = inner.in_flight.acquire_many(DRAIN_PERMITS).await {
                    inner.in_flight.close();
                    drop(drained);
                }
                log::info!("All in-flight mutations drained");

                let closed = inner.index.close().await.map_err(|e| e.to_string());
                inner.service.set_state(ServiceState::Stopped);
                closed
            })
            .await;
        outcome.clone().map_err(Error::index)
    }

    async fn admit(&self) -> Result<OwnedSemaphorePermit> {
        self.inner.service.ensure_ready()?;
        Arc::clone(&self.inner.in_flight)
            .acquire_owned()
            .await
            .map_err(|_| Error::unavailable("service is shutting down"))
    }
}

impl Inner {
    async fn create(&self, item: NewItem) -> Result<Item> {
        let mut catalog = self.catalog.write().await;
        let created = catalog.insert(item)?;

        if let Err(e) = self.index.upsert(&ProductDocument::from(&created)).await {
            catalog.remove(created.id);
            log::error!(
                "Index upsert failed for item {}; creation rolled back: {e}",
                created.id
            );
            return Err(e);
        }

        log::debug!("Created item {} '{}'", created.id, created.name);
        Ok(created)
    }

    async fn delete(&self, id: ItemId) -> Result<Item> {
        let removed = self.catalog.write().await.remove(id);
        let Some(item) = removed else {
            log::debug!("Delete of unknown item {id}");
            return Err(Error::not_found(id));
        };

        if let Err(e) = self.index.delete(id).await {
            log::warn!("Item {id} removed from catalog but index delete failed: {e}");
            return Err(e);
        }

        log::debug!("Deleted item {id}");
        Ok(item)
    }
}

/// Run a mutation on its own task and wait for it.
///
/// Dropping the returned future does not cancel the mutation.
async fn run_to_completion<F, T>(mutation: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(mutation)
        .await
        .map_err(|e| Error::index(format!("mutation task did not complete: {e}")))?
}

impl std::fmt::Debug for SearchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCoordinator")
            .field("service", &self.inner.service)
            .field("backend", &self.inner.index.name())
            .field("max_results", &self.max_results)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
