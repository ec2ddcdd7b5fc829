//! Service configuration.
//!
//! [`CatalogConfig`] is read from an optional TOML file; every field has a
//! default, so an empty file (or no file) yields a working configuration.
//! Command-line flags are applied on top by the binary.
//!
//! ```toml
//! bind = "127.0.0.1:8080"
//! seed_count = 1000
//! batch_size = 10000
//! shutdown_grace_secs = 5
//! max_results = 50
//!
//! [index]
//! backend = "tantivy"
//! writer_memory_bytes = 50000000
//! stopwords_enabled = true
//! stopword_allowlist = []
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::seed::DEFAULT_SEED_COUNT;

/// Hard cap on search results, regardless of configuration.
pub const MAX_RESULTS: usize = 50;

/// Backends understood by [`IndexConfig::backend`].
pub const KNOWN_BACKENDS: [&str; 2] = ["tantivy", "simple"];

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Number of synthetic items seeded at startup.
    #[serde(default = "default_seed_count")]
    pub seed_count: usize,

    /// Documents per commit during the initial index build.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Seconds allowed for in-flight work to drain on shutdown.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,

    /// Maximum results per search (at most [`MAX_RESULTS`]).
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Search index settings.
    #[serde(default)]
    pub index: IndexConfig,
}

/// Search index settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Backend type: "tantivy" or "simple".
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Memory budget for the index writer, in bytes.
    #[serde(default = "default_writer_memory")]
    pub writer_memory_bytes: usize,

    /// Drop common English words when analyzing names and queries.
    #[serde(default = "default_true")]
    pub stopwords_enabled: bool,

    /// Words kept searchable even though they are on the stopword list.
    #[serde(default)]
    pub stopword_allowlist: Vec<String>,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_seed_count() -> usize {
    DEFAULT_SEED_COUNT
}

fn default_batch_size() -> usize {
    10_000
}

fn default_shutdown_grace_secs() -> u64 {
    5
}

fn default_max_results() -> usize {
    MAX_RESULTS
}

fn default_backend() -> String {
    "tantivy".to_string()
}

fn default_writer_memory() -> usize {
    50_000_000
}

fn default_true() -> bool {
    true
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            seed_count: default_seed_count(),
            batch_size: default_batch_size(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
            max_results: default_max_results(),
            index: IndexConfig::default(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            writer_memory_bytes: default_writer_memory(),
            stopwords_enabled: true,
            stopword_allowlist: Vec::new(),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from a TOML file, or defaults when `path` is `None`.
    ///
    /// The result is not validated: callers apply their overrides first and
    /// then call [`CatalogConfig::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
                Self::from_toml_str(&content).map_err(|e| match e {
                    Error::Config(msg) => {
                        Error::config(format!("Failed to parse {}: {msg}", path.display()))
                    }
                    other => other,
                })?
            }
            None => Self::default(),
        };
        Ok(config)
    }

    /// Parse configuration from TOML text without validating it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        if self.batch_size == 0 {
            return Err(Error::config("batch_size must be greater than zero"));
        }
        if self.max_results == 0 || self.max_results > MAX_RESULTS {
            return Err(Error::config(format!(
                "max_results must be between 1 and {MAX_RESULTS}, got {}",
                self.max_results
            )));
        }
        if !KNOWN_BACKENDS.contains(&self.index.backend.as_str()) {
            return Err(Error::config(format!(
                "unknown index backend '{}' (expected one of: {})",
                self.index.backend,
                KNOWN_BACKENDS.join(", ")
            )));
        }
        Ok(())
    }

    /// Parsed bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| Error::config(format!("invalid bind address '{}': {e}", self.bind)))
    }

    /// Shutdown grace period.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================
