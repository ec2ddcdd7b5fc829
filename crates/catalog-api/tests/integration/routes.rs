//! Route behavior: statuses, bodies and consistency with the catalog.

use std::sync::Arc;

use axum::http::StatusCode;
use catalog_api::router;
use catalog_core::{Catalog, Item};
use catalog_fts::SimpleIndex;
use catalog_search::SearchCoordinator;

use crate::common::TestApp;

fn items(body: &str) -> Vec<Item> {
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn test_search_returns_ranked_json() {
    let app = TestApp::new(1000).await;
    let (status, body) = app.get("/search?q=Wireless%20Mouse").await;

    assert_eq!(status, StatusCode::OK);
    let hits = items(&body);
    assert_eq!(hits.len(), 50);
    assert!(hits.iter().all(|item| item.name.starts_with("Wireless Mouse")));

    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    let first = &value[0];
    assert!(first["id"].is_u64());
    assert!(first["name"].is_string());
    assert_eq!(first["category"], "Electronics");
}

#[tokio::test]
async fn test_search_own_name_first() {
    let app = TestApp::new(100).await;
    let (status, body) = app.get("/search?q=Water+Bottle+14").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(items(&body)[0].id, 14);
}

#[tokio::test]
async fn test_search_empty_and_missing_query() {
    let app = TestApp::new(20).await;

    for uri in ["/search", "/search?q=", "/search?q=zzzz"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, "[]", "{uri}");
    }
}

#[tokio::test]
async fn test_search_repeated_q_uses_first() {
    let app = TestApp::new(20).await;

    let (status, body) = app.get("/search?q=mouse&q=yoga").await;
    assert_eq!(status, StatusCode::OK);
    let hits = items(&body);
    assert!(!hits.is_empty());
    assert!(hits.iter().all(|item| item.name.starts_with("Wireless Mouse")));

    let (status, body) = app.get("/search?page=2&q=yoga").await;
    assert_eq!(status, StatusCode::OK);
    assert!(items(&body).iter().all(|item| item.name.starts_with("Yoga Mat")));
}

#[tokio::test]
async fn test_search_index_failure_is_500() {
    let app = TestApp::new(20).await;
    app.faults.set_fail_query(true);

    let (status, body) = app.get("/search?q=mouse").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("injected query failure"));
}

#[tokio::test]
async fn test_create_then_search() {
    let app = TestApp::new(20).await;
    let (status, body) = app
        .post_json("/products", r#"{"name":"Test Widget","category":"Misc"}"#)
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let created: Item = serde_json::from_str(&body).unwrap();
    assert_eq!(created.id, 21);
    assert_eq!(created.name, "Test Widget");
    assert_eq!(created.category, "Misc");

    let (_, body) = app.get("/search?q=Test%20Widget").await;
    assert_eq!(items(&body), vec![created]);
}

#[tokio::test]
async fn test_create_ignores_supplied_id() {
    let app = TestApp::new(20).await;
    let (status, body) = app
        .post_json("/products", r#"{"id":3,"name":"Desk Lamp","category":"Home"}"#)
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let created: Item = serde_json::from_str(&body).unwrap();
    assert_eq!(created.id, 21);

    // Item 3 is untouched
    let (_, body) = app.get("/products/3").await;
    let original: Item = serde_json::from_str(&body).unwrap();
    assert_eq!(original.name, "Gaming Keyboard 3");
}

#[tokio::test]
async fn test_create_missing_fields_default_to_empty() {
    let app = TestApp::new(5).await;
    let (status, body) = app.post_json("/products", r#"{"name":"Bare"}"#).await;

    assert_eq!(status, StatusCode::CREATED);
    let created: Item = serde_json::from_str(&body).unwrap();
    assert_eq!(created.category, "");
}

#[tokio::test]
async fn test_create_null_body_is_empty_product() {
    let app = TestApp::new(5).await;
    let (status, body) = app.post_json("/products", "null").await;

    assert_eq!(status, StatusCode::CREATED);
    let created: Item = serde_json::from_str(&body).unwrap();
    assert_eq!(created.id, 6);
    assert!(created.name.is_empty());
    assert!(created.category.is_empty());
    assert_eq!(app.coordinator.catalog().len().await, 6);
}

#[tokio::test]
async fn test_create_invalid_json_is_400() {
    let app = TestApp::new(5).await;

    for body in ["", "{", "not json", r#"{"name": 5}"#] {
        let (status, text) = app.post_json("/products", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(text.starts_with("Invalid request body"), "{text}");
    }
    assert_eq!(app.coordinator.catalog().len().await, 5);
}

#[tokio::test]
async fn test_create_index_failure_rolls_back() {
    let app = TestApp::new(5).await;
    app.faults.set_fail_upsert(true);

    let (status, _) = app
        .post_json("/products", r#"{"name":"Doomed","category":"Misc"}"#)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.coordinator.catalog().len().await, 5);

    let (status, _) = app.get("/products/6").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_then_delete_again() {
    let app = TestApp::new(10).await;

    let (status, body) = app.delete("/products/2").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, body) = app.delete("/products/2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Product not found");

    let (_, body) = app.get("/search?q=Running%20Shoes%202").await;
    assert!(items(&body).iter().all(|item| item.id != 2));
}

#[tokio::test]
async fn test_delete_bad_ids() {
    let app = TestApp::new(10).await;

    let (status, body) = app.delete("/products/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid product ID");

    for uri in ["/products/0", "/products/-1", "/products/11"] {
        let (status, _) = app.delete(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
    assert_eq!(app.coordinator.catalog().len().await, 10);
}

#[tokio::test]
async fn test_delete_index_failure_keeps_removal() {
    let app = TestApp::new(10).await;
    app.faults.set_fail_delete(true);

    let (status, _) = app.delete("/products/4").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = app.get("/products/4").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/search?q=Water%20Bottle%204").await;
    assert!(items(&body).iter().all(|item| item.id != 4));
}

#[tokio::test]
async fn test_get_product() {
    let app = TestApp::new(10).await;

    let (status, body) = app.get("/products/5").await;
    assert_eq!(status, StatusCode::OK);
    let item: Item = serde_json::from_str(&body).unwrap();
    assert_eq!(item.name, "Yoga Mat 5");
    assert_eq!(item.category, "Fitness");

    let (status, _) = app.get("/products/five").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(10).await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["status"], "ready");
    assert_eq!(value["items"], 10);
    assert_eq!(value["backend"], "simple");

    app.coordinator.shutdown().await.unwrap();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("stopped"));

    let (status, _) = app.get("/search?q=mouse").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_not_ready_is_503() {
    let coordinator =
        SearchCoordinator::new(Arc::new(Catalog::new()), Arc::new(SimpleIndex::new()));
    let app = TestApp {
        router: router(coordinator.clone()),
        coordinator,
        faults: Arc::new(catalog_fts::FaultyIndex::new(Arc::new(SimpleIndex::new()))),
    };

    let (status, _) = app.get("/search?q=mouse").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (status, _) = app
        .post_json("/products", r#"{"name":"Early","category":"Misc"}"#)
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (status, _) = app.get("/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
