//! # catalog-api
//!
//! HTTP API for the catalog search service.
//!
//! This crate provides:
//! - The axum router over a [`SearchCoordinator`](catalog_search::SearchCoordinator)
//! - Mapping of catalog errors to HTTP statuses with plain-text bodies
//! - The [`Server`], which bootstraps the catalog, serves, and shuts down
//!   within a bounded grace period

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use routes::router;
pub use server::{Server, shutdown_signal};
