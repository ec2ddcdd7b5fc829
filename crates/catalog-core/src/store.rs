//! The authoritative item store.
//!
//! [`Catalog`] owns item identity: it allocates identifiers, stores records
//! and removes them. It knows nothing about search. All state sits behind a
//! single reader/writer lock, so any number of readers proceed in parallel
//! while a writer (seed, insert, remove) has exclusive access.
//!
//! Callers that need several operations to happen inside one exclusive
//! section (the coordinator's insert-then-index-then-maybe-rollback) take a
//! [`CatalogWriteGuard`] with [`Catalog::write`] and operate on it directly.
//!
//! # Identifier allocation
//!
//! The allocator starts at 1, is moved above the seeded range by
//! [`Catalog::seed`], and only ever increases. An identifier handed out by
//! an insert that is later removed is never handed out again.

use std::collections::HashMap;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Error, Result};
use crate::item::{Item, ItemId, NewItem};
use crate::seed;

#[derive(Debug)]
struct CatalogState {
    items: HashMap<ItemId, Item>,
    next_id: ItemId,
    seeded: bool,
}

impl CatalogState {
    fn insert(&mut self, item: NewItem) -> Result<Item> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(Error::IdsExhausted)?;
        let stored = item.with_id(id);
        self.items.insert(id, stored.clone());
        Ok(stored)
    }
}

/// Lock-guarded mapping from identifier to item.
#[derive(Debug)]
pub struct Catalog {
    state: RwLock<CatalogState>,
}

impl Catalog {
    /// Create an empty catalog whose first identifier is 1.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CatalogState {
                items: HashMap::new(),
                next_id: 1,
                seeded: false,
            }),
        }
    }

    /// Populate the catalog with `n` generated items (ids `1..=n`).
    ///
    /// The write lock is held for the whole generation, so no reader ever
    /// observes a partially seeded catalog. Seeding is allowed once, and only
    /// on an empty catalog. Returns the seeded items in id order.
    pub async fn seed(&self, n: usize) -> Result<Vec<Item>> {
        let mut state = self.state.write().await;
        if state.seeded || !state.items.is_empty() {
            return Err(Error::startup("catalog is already populated"));
        }

        let items = seed::generate(n);
        state.items.reserve(items.len());
        for item in &items {
            state.items.insert(item.id, item.clone());
        }
        let first_free = (n as ItemId)
            .checked_add(1)
            .ok_or(Error::IdsExhausted)?;
        state.next_id = state.next_id.max(first_free);
        state.seeded = true;

        log::info!(
            "Seeded catalog with {} items (next id {})",
            items.len(),
            state.next_id
        );
        Ok(items)
    }

    /// Look up an item.
    pub async fn get(&self, id: ItemId) -> Result<Item> {
        self.state
            .read()
            .await
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(id))
    }

    /// Store a new item under the next identifier.
    ///
    /// Fails only when the identifier space is exhausted.
    pub async fn insert(&self, item: NewItem) -> Result<Item> {
        self.write().await.insert(item)
    }

    /// Remove an item. Returns `false` if there was nothing to remove.
    pub async fn remove(&self, id: ItemId) -> bool {
        self.write().await.remove(id).is_some()
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    /// Whether the catalog holds no items.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Acquire shared access.
    pub async fn read(&self) -> CatalogReadGuard<'_> {
        CatalogReadGuard {
            state: self.state.read().await,
        }
    }

    /// Acquire exclusive access.
    pub async fn write(&self) -> CatalogWriteGuard<'_> {
        CatalogWriteGuard {
            state: self.state.write().await,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared view of the catalog. Writers wait until every read guard drops.
pub struct CatalogReadGuard<'a> {
    state: RwLockReadGuard<'a, CatalogState>,
}

impl CatalogReadGuard<'_> {
    /// Borrow an item.
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.state.items.get(&id)
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.state.items.len()
    }

    /// Whether the catalog holds no items.
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }
}

/// Exclusive access to the catalog.
///
/// Every mutation made through one guard is a single critical section: no
/// other reader or writer runs until the guard drops.
pub struct CatalogWriteGuard<'a> {
    state: RwLockWriteGuard<'a, CatalogState>,
}

impl CatalogWriteGuard<'_> {
    /// Store a new item under the next identifier.
    pub fn insert(&mut self, item: NewItem) -> Result<Item> {
        self.state.insert(item)
    }

    /// Remove an item, returning it if it existed.
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        self.state.items.remove(&id)
    }

    /// Borrow an item.
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.state.items.get(&id)
    }

    /// Identifier the next insert will receive.
    pub fn next_id(&self) -> ItemId {
        self.state.next_id
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.state.items.len()
    }

    /// Whether the catalog holds no items.
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }
}

impl std::fmt::Debug for CatalogReadGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogReadGuard")
            .field("items", &self.state.items.len())
            .finish()
    }
}

impl std::fmt::Debug for CatalogWriteGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogWriteGuard")
            .field("items", &self.state.items.len())
            .field("next_id", &self.state.next_id)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
