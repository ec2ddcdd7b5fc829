//! Search coordination for the catalog.
//!
//! This crate ties the authoritative [`Catalog`](catalog_core::Catalog) to a
//! [`SearchIndex`](catalog_fts::SearchIndex) through [`SearchCoordinator`],
//! which owns the ordering and locking discipline that keeps the two
//! consistent under concurrent requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_core::{CatalogConfig, NewItem};
//! use catalog_search::SearchCoordinator;
//!
//! let config = CatalogConfig::default();
//! let coordinator = SearchCoordinator::from_config(&config)?;
//! coordinator.bootstrap(config.seed_count, config.batch_size).await?;
//!
//! let widget = coordinator.create(NewItem::new("Test Widget", "Misc")).await?;
//! let hits = coordinator.search("widget").await?;
//! assert_eq!(hits[0].id, widget.id);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod coordinator;

pub use coordinator::{DRAIN_PERMITS, HealthReport, SearchCoordinator};
