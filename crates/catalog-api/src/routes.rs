//! HTTP routes.
//!
//! | Method | Path | Success | Errors |
//! |--------|------|---------|--------|
//! | GET | `/search?q=<text>` | 200 JSON array | 500 index failure |
//! | POST | `/products` | 201 created item | 400 bad JSON, 500 index failure |
//! | GET | `/products/{id}` | 200 item | 400 bad id, 404 missing |
//! | DELETE | `/products/{id}` | 204 empty | 400 bad id, 404 missing, 500 index failure |
//! | GET | `/health` | 200 JSON report | 503 not ready |
//!
//! Any route answers 503 while the service is starting or draining.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use catalog_core::{Error, Item, ItemId, NewItem};
use catalog_search::SearchCoordinator;

use crate::error::{ApiError, Result};

/// Build the application router over a coordinator.
pub fn router(coordinator: SearchCoordinator) -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/products", post(create_product))
        .route("/products/{id}", get(get_product).delete(delete_product))
        .route("/health", get(health))
        .with_state(coordinator)
}

async fn search(
    State(coordinator): State<SearchCoordinator>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Item>>> {
    let text = search_text(params);
    let items = coordinator.search(&text).await?;
    tracing::debug!(query = %text, hits = items.len(), "search");
    Ok(Json(items))
}

/// The first `q` parameter; missing means empty. Repeats are ignored.
fn search_text(params: Vec<(String, String)>) -> String {
    params
        .into_iter()
        .find_map(|(key, value)| (key == "q").then_some(value))
        .unwrap_or_default()
}

async fn create_product(
    State(coordinator): State<SearchCoordinator>,
    body: Bytes,
) -> Result<(StatusCode, Json<Item>)> {
    // A JSON `null` body is a product with no fields
    let candidate: Option<NewItem> =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;

    let item = coordinator.create(candidate.unwrap_or_default()).await?;
    tracing::info!(id = item.id, name = %item.name, "product created");
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_product(
    State(coordinator): State<SearchCoordinator>,
    Path(raw): Path<String>,
) -> Result<Json<Item>> {
    let id = parse_id(&raw)?;
    Ok(Json(coordinator.get(id).await?))
}

async fn delete_product(
    State(coordinator): State<SearchCoordinator>,
    Path(raw): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&raw)?;
    let item = coordinator.delete(id).await?;
    tracing::info!(id = item.id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn health(State(coordinator): State<SearchCoordinator>) -> Response {
    let report = coordinator.health().await;
    let status = if report.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}

/// Parse a path identifier.
///
/// Anything that is not an integer is a bad request. Integers that can never
/// name an item (zero, negatives) are simply not found.
fn parse_id(raw: &str) -> Result<ItemId> {
    let id: i64 = raw.parse().map_err(|_| ApiError::InvalidId)?;
    ItemId::try_from(id)
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| Error::not_found(raw).into())
}

// ============================================================================
// Tests
// ============================================================================
