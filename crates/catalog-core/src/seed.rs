//! Synthetic dataset generation.
//!
//! The catalog starts from a fixed-size dataset produced by cycling a small
//! template set. Item `i` (1-based) is built from template `(i - 1) % 5` and
//! named `"<Template> <i>"`, so the default 1000-item seed yields 200 items
//! per template.

use crate::item::{Item, ItemId};

/// Number of items seeded when no count is configured.
pub const DEFAULT_SEED_COUNT: usize = 1000;

/// A name/category pair the generator cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    /// Base name; the item index is appended to it.
    pub name: &'static str,
    /// Category copied verbatim.
    pub category: &'static str,
}

/// The fixed template set.
pub const TEMPLATES: [Template; 5] = [
    Template {
        name: "Wireless Mouse",
        category: "Electronics",
    },
    Template {
        name: "Running Shoes",
        category: "Footwear",
    },
    Template {
        name: "Gaming Keyboard",
        category: "Electronics",
    },
    Template {
        name: "Water Bottle",
        category: "Home & Kitchen",
    },
    Template {
        name: "Yoga Mat",
        category: "Fitness",
    },
];

/// Build the item with identifier `id` (1-based).
pub fn item_for(id: ItemId) -> Item {
    let template = TEMPLATES[((id.saturating_sub(1)) % TEMPLATES.len() as u64) as usize];
    Item {
        id,
        name: format!("{} {id}", template.name),
        category: template.category.to_string(),
    }
}

/// Generate `n` items with sequential identifiers `1..=n`.
pub fn generate(n: usize) -> Vec<Item> {
    (1..=n as ItemId).map(item_for).collect()
}

// ============================================================================
// Tests
// ============================================================================
