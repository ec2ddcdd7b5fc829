//! Error types for catalog-api
//!
//! Every failure leaves the API as a plain-text body with the status the
//! error maps to. Client errors are not logged as faults.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by HTTP handlers
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    /// The `{id}` path segment is not an integer.
    #[error("Invalid product ID")]
    InvalidId,

    /// The request body is not a valid item.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Error from the catalog or its index
    #[error(transparent)]
    Core(#[from] catalog_core::Error),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        use catalog_core::Error as Core;

        match self {
            Self::InvalidId | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Core(Core::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Core(Core::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Core(Core::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error is a service fault rather than normal traffic.
    ///
    /// Bad requests, missing items and unavailability while starting or
    /// draining are expected outcomes.
    pub fn is_fault(&self) -> bool {
        match self {
            Self::InvalidId | Self::InvalidBody(_) => false,
            Self::Core(e) => e.is_fault(),
        }
    }

    fn body(&self) -> String {
        match self {
            Self::Core(catalog_core::Error::NotFound { .. }) => "Product not found".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_fault() {
            tracing::error!(%status, "{}", self);
        } else {
            tracing::debug!(%status, "{}", self);
        }
        (status, self.body()).into_response()
    }
}

// ============================================================================
// Tests
// ============================================================================
