//! Service lifecycle state.
//!
//! Provides [`ServiceState`] and [`ServiceHandle`] for tracking whether the
//! catalog may serve traffic. The handle moves through
//! `Stopped → Starting → Ready → Stopping → Stopped`, or to `Failed` when
//! seeding or the initial index build fails.
//!
//! # Usage
//!
//! ```rust
//! use catalog_core::service::{ServiceHandle, ServiceState};
//!
//! let handle = ServiceHandle::new("catalog");
//! assert!(handle.ensure_ready().is_err());
//!
//! handle.set_state(ServiceState::Starting);
//! handle.set_state(ServiceState::Ready);
//! assert!(handle.ensure_ready().is_ok());
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{Error, Result};

// ============================================================================
// ServiceState
// ============================================================================

/// State of the service in its lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceState {
    /// Not started, or fully shut down.
    Stopped,
    /// Seeding the catalog and building the index.
    Starting,
    /// Accepting searches and mutations.
    Ready,
    /// Draining in-flight mutations before releasing the index.
    Stopping,
    /// Startup failed.
    Failed(String),
}

impl ServiceState {
    /// Returns `true` if requests may be served.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Starting => write!(f, "starting"),
            Self::Ready => write!(f, "ready"),
            Self::Stopping => write!(f, "stopping"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

// ============================================================================
// ServiceHandle
// ============================================================================

/// Thread-safe handle for observing and updating service state.
///
/// Cheap to clone (Arc internals). The state lives in a watch channel, so
/// compare-and-set transitions are atomic.
#[derive(Clone)]
pub struct ServiceHandle {
    inner: Arc<ServiceHandleInner>,
}

struct ServiceHandleInner {
    name: String,
    tx: watch::Sender<ServiceState>,
}

impl ServiceHandle {
    /// Create a new service handle with the given name.
    ///
    /// Initial state is [`ServiceState::Stopped`].
    pub fn new(name: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(ServiceState::Stopped);
        Self {
            inner: Arc::new(ServiceHandleInner {
                name: name.into(),
                tx,
            }),
        }
    }

    /// Get the service name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Get the current service state.
    pub fn state(&self) -> ServiceState {
        self.inner.tx.borrow().clone()
    }

    /// Update the service state.
    pub fn set_state(&self, state: ServiceState) {
        log::info!("Service '{}' -> {state}", self.inner.name);
        self.inner.tx.send_replace(state);
    }

    /// Move to `next` only if the current state is `expected`.
    ///
    /// Returns whether the transition happened.
    pub fn transition(&self, expected: &ServiceState, next: ServiceState) -> bool {
        let moved = self.inner.tx.send_if_modified(|current| {
            if current == expected {
                *current = next.clone();
                true
            } else {
                false
            }
        });
        if moved {
            log::info!("Service '{}' -> {next}", self.inner.name);
        }
        moved
    }

    /// Fail with [`Error::Unavailable`] unless the service is ready.
    pub fn ensure_ready(&self) -> Result<()> {
        let state = self.state();
        if state.is_ready() {
            Ok(())
        } else {
            Err(Error::unavailable(format!(
                "service '{}' is {state}",
                self.inner.name
            )))
        }
    }

}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("name", &self.inner.name)
            .field("state", &self.state())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
