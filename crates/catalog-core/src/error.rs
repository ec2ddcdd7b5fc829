//! Error types for catalog-core

use std::fmt::Display;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the store, the index backends and the coordinator.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Malformed input (request body, identifier, configuration value).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The requested item does not exist.
    #[error("Item not found: {id}")]
    NotFound {
        /// Identifier as supplied by the caller.
        id: String,
    },

    /// The search index rejected an upsert, delete or query.
    #[error("Index error: {0}")]
    Index(String),

    /// Seeding or the initial index build failed.
    #[error("Startup failed: {0}")]
    Startup(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error tied to a path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The service is not accepting requests (starting or draining).
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The identifier allocator has no identifiers left.
    #[error("Identifier space exhausted")]
    IdsExhausted,
}

impl Error {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not-found error for the given identifier.
    pub fn not_found(id: impl Display) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::Index(msg.into())
    }

    /// Create a startup error.
    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an I/O error with the path that caused it.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Whether the caller is at fault (malformed input or a missing item).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::NotFound { .. })
    }

    /// Whether the error should be logged as a service fault.
    ///
    /// Not-found and validation outcomes are normal traffic; unavailability
    /// during startup or shutdown is expected as well.
    pub fn is_fault(&self) -> bool {
        !self.is_client_error() && !matches!(self, Error::Unavailable(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
