//! Item records.
//!
//! An [`Item`] is the unit the catalog stores and the index searches. Its
//! `name` is the only searchable field; `category` travels with the record
//! but is never matched against.

use serde::{Deserialize, Serialize};

/// Identifier assigned by the catalog. Positive and never reused.
pub type ItemId = u64;

/// A stored catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Catalog-assigned identifier.
    pub id: ItemId,
    /// Free-text searchable name.
    pub name: String,
    /// Stored, unsearchable category.
    pub category: String,
}

/// An item that has not been assigned an identifier yet.
///
/// Any `id` carried by an incoming payload is ignored; the catalog always
/// assigns its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    /// Free-text searchable name.
    #[serde(default)]
    pub name: String,
    /// Stored, unsearchable category.
    #[serde(default)]
    pub category: String,
}

impl NewItem {
    /// Create a candidate item.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }

    /// Attach an identifier, producing the stored form.
    pub fn with_id(self, id: ItemId) -> Item {
        Item {
            id,
            name: self.name,
            category: self.category,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
