//! Index document representation.
//!
//! [`ProductDocument`] is what the catalog hands to a [`SearchIndex`]: the
//! identifier plus the fields the schema knows about. Only `name` is
//! matchable; `category` is carried so a backend can store it.
//!
//! [`SearchIndex`]: crate::SearchIndex

use catalog_core::{Item, ItemId};
use serde::{Deserialize, Serialize};

/// A document to be indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDocument {
    /// Catalog identifier; the document's key.
    pub id: ItemId,
    /// Searchable name.
    pub name: String,
    /// Stored-only category.
    pub category: String,
}

impl ProductDocument {
    /// Create a document.
    pub fn new(id: ItemId, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
        }
    }
}

impl From<&Item> for ProductDocument {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            category: item.category.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
