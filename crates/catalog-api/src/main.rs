//! Catalog server
//!
//! Seeds the catalog, builds its search index and serves the HTTP API until
//! Ctrl+C or SIGTERM.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use catalog_api::{Server, shutdown_signal};
use catalog_core::CatalogConfig;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Catalog search service
#[derive(Parser, Debug)]
#[command(name = "catalog-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "CATALOG_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8080
    #[arg(long, env = "CATALOG_BIND")]
    bind: Option<String>,

    /// Number of synthetic items to seed
    #[arg(long, env = "CATALOG_SEED_COUNT")]
    seed_count: Option<usize>,

    /// Documents per commit during the initial index build
    #[arg(long, env = "CATALOG_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Index backend: tantivy or simple
    #[arg(long, env = "CATALOG_BACKEND")]
    backend: Option<String>,

    /// Enable debug logging (ignored when RUST_LOG is set)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, config: &mut CatalogConfig) {
        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        if let Some(seed_count) = self.seed_count {
            config.seed_count = seed_count;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(backend) = &self.backend {
            config.index.backend = backend.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = CatalogConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let server = Server::new(config)?;
    server
        .bootstrap()
        .await
        .context("Startup failed; refusing to serve")?;

    let listener = server.bind().await?;
    server.run(listener, shutdown_signal()).await
}

// ============================================================================
// Tests
// ============================================================================
