//! API server implementation
//!
//! [`Server`] owns the configuration and the coordinator. Startup seeds the
//! catalog and builds the index before the listener accepts a single
//! request. Shutdown stops accepting connections, lets in-flight requests
//! finish, drains running mutations and releases the index, all within the
//! configured grace period measured from the shutdown signal.

use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, bail};
use axum::Router;
use catalog_core::CatalogConfig;
use catalog_fts::IndexStats;
use catalog_search::SearchCoordinator;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::routes;

/// Catalog API server
#[derive(Debug)]
pub struct Server {
    config: CatalogConfig,
    coordinator: SearchCoordinator,
}

impl Server {
    /// Create a server for `config` with an empty catalog.
    pub fn new(config: CatalogConfig) -> catalog_core::Result<Self> {
        config.validate()?;
        let coordinator = SearchCoordinator::from_config(&config)?;
        Ok(Self {
            config,
            coordinator,
        })
    }

    /// Create a server around an existing coordinator.
    pub fn with_coordinator(config: CatalogConfig, coordinator: SearchCoordinator) -> Self {
        Self {
            config,
            coordinator,
        }
    }

    /// The coordinator behind the routes.
    pub fn coordinator(&self) -> &SearchCoordinator {
        &self.coordinator
    }

    /// Seed the catalog and build the index.
    ///
    /// A failure here is fatal: the server must not start serving.
    pub async fn bootstrap(&self) -> catalog_core::Result<IndexStats> {
        let stats = self
            .coordinator
            .bootstrap(self.config.seed_count, self.config.batch_size)
            .await?;
        tracing::info!(
            documents = stats.documents_indexed,
            batches = stats.batches,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Catalog ready"
        );
        Ok(stats)
    }

    /// The application router.
    pub fn router(&self) -> Router {
        routes::router(self.coordinator.clone())
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> anyhow::Result<TcpListener> {
        let addr: SocketAddr = self.config.bind_addr()?;
        TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))
    }

    /// Serve until `signal` resolves, then shut down within the grace period.
    ///
    /// Returns an error if serving fails or if connections, running
    /// mutations and the index release do not finish in time.
    pub async fn run<F>(self, listener: TcpListener, signal: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let grace = self.config.shutdown_grace();
        if let Ok(addr) = listener.local_addr() {
            tracing::info!("Server listening on {addr}");
        }

        let (stopped_tx, stopped_rx) = oneshot::channel::<Instant>();
        let serve = axum::serve(listener, self.router()).with_graceful_shutdown(async move {
            signal.await;
            tracing::info!("Shutdown signal received");
            let _ = stopped_tx.send(Instant::now());
        });
        let serve = tokio::spawn(async move { serve.await });

        // The sender drops unsent if the server stops on its own
        let signalled_at = stopped_rx.await.unwrap_or_else(|_| Instant::now());

        let coordinator = self.coordinator.clone();
        let drain = async move {
            serve
                .await
                .context("Server task failed")?
                .context("Server error")?;
            coordinator.shutdown().await?;
            anyhow::Ok(())
        };

        match tokio::time::timeout_at(signalled_at + grace, drain).await {
            Ok(result) => {
                result?;
                tracing::info!("Shutdown complete");
                Ok(())
            }
            Err(_) => bail!(
                "Shutdown did not complete within {}s",
                grace.as_secs()
            ),
        }
    }
}

/// Resolve on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

// ============================================================================
// Tests
// ============================================================================
