//! Catalog Core: shared types, errors, configuration and the item store.
//!
//! This crate provides the foundational types used across all catalog crates.
//! It has no internal catalog dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`item`]: The `Item` record and its id-less `NewItem` form
//! - [`store`]: The authoritative, lock-guarded [`Catalog`]
//! - [`seed`]: Synthetic dataset generation from a fixed template set
//! - [`config`]: Service configuration loaded from TOML
//! - [`service`]: Lifecycle state shared by the coordinator and the server

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod item;
pub mod seed;
pub mod service;
pub mod store;

// Re-export key types at crate root for convenience
pub use config::{CatalogConfig, IndexConfig, MAX_RESULTS};
pub use error::{Error, Result};
pub use item::{Item, ItemId, NewItem};
pub use service::{ServiceHandle, ServiceState};
pub use store::{Catalog, CatalogReadGuard, CatalogWriteGuard};
