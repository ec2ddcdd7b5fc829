//! Startup and shutdown: readiness gating and the in-flight drain.

use std::sync::Arc;
use std::time::Duration;

use catalog_core::{Catalog, Error, NewItem, ServiceState};
use catalog_fts::{FaultyIndex, SimpleIndex};
use catalog_search::SearchCoordinator;

use crate::common::{GatedIndex, gated, simple};

#[tokio::test]
async fn test_bootstrap_reports_stats() {
    let coordinator = SearchCoordinator::new(Arc::new(Catalog::new()), Arc::new(SimpleIndex::new()));
    assert_eq!(coordinator.service().state(), ServiceState::Stopped);

    let stats = coordinator.bootstrap(1000, 300).await.unwrap();
    assert_eq!(stats.documents_indexed, 1000);
    assert_eq!(stats.batches, 4);
    assert_eq!(coordinator.service().state(), ServiceState::Ready);
    assert_eq!(coordinator.index().doc_count().await.unwrap(), 1000);
}

#[tokio::test]
async fn test_failed_bootstrap_never_serves() {
    let index = FaultyIndex::new(Arc::new(SimpleIndex::new())).failing_batches();
    let coordinator = SearchCoordinator::new(Arc::new(Catalog::new()), Arc::new(index));

    let err = coordinator.bootstrap(100, 10).await.unwrap_err();
    assert!(matches!(err, Error::Startup(_)));

    let health = coordinator.health().await;
    assert!(!health.is_ready());
    assert!(health.status.starts_with("failed"));
    assert!(matches!(
        coordinator.get(1).await.unwrap_err(),
        Error::Unavailable(_)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shutdown_drains_in_flight_create() {
    let (coordinator, index) = gated(10).await;
    index.gate_next_upsert();

    let create = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.create(NewItem::new("Late Lantern", "Misc")).await })
    };
    index.wait_parked().await;
    assert_eq!(coordinator.in_flight(), 1);

    let shutdown = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.shutdown().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!shutdown.is_finished());
    assert_eq!(coordinator.service().state(), ServiceState::Stopping);

    // New work is refused while draining
    let refused = coordinator
        .create(NewItem::new("Too Late", "Misc"))
        .await
        .unwrap_err();
    assert!(matches!(refused, Error::Unavailable(_)));
    assert!(matches!(
        coordinator.search("lantern").await.unwrap_err(),
        Error::Unavailable(_)
    ));

    index.release();
    let created = create.await.unwrap().unwrap();
    assert_eq!(created.id, 11);
    shutdown.await.unwrap().unwrap();

    assert_eq!(coordinator.service().state(), ServiceState::Stopped);
    assert!(coordinator.catalog().get(11).await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shutdown_can_be_bounded() {
    let (coordinator, index) = gated(10).await;
    index.gate_next_delete();

    let delete = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.delete(2).await })
    };
    index.wait_parked().await;

    let bounded = tokio::time::timeout(Duration::from_millis(100), coordinator.shutdown()).await;
    assert!(bounded.is_err(), "shutdown must wait for the parked delete");

    index.release();
    delete.await.unwrap().unwrap();
    coordinator.shutdown().await.unwrap();
    assert_eq!(coordinator.service().state(), ServiceState::Stopped);
}

#[tokio::test]
async fn test_health_after_mutations() {
    let coordinator = simple(20).await;
    coordinator
        .create(NewItem::new("Desk Lamp", "Home & Kitchen"))
        .await
        .unwrap();
    coordinator.delete(1).await.unwrap();

    let health = coordinator.health().await;
    assert!(health.is_ready());
    assert_eq!(health.items, 20);
    assert_eq!(health.backend, "simple");

    let json = serde_json::to_value(&health).unwrap();
    assert_eq!(json["status"], "ready");
    assert_eq!(json["items"], 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shutdown_during_startup_wins() {
    let index = Arc::new(GatedIndex::new());
    let coordinator = SearchCoordinator::new(Arc::new(Catalog::new()), index.clone());
    index.gate_next_batch();

    let bootstrap = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.bootstrap(10, 64).await })
    };
    index.wait_parked().await;
    assert_eq!(coordinator.service().state(), ServiceState::Starting);

    coordinator.shutdown().await.unwrap();
    assert_eq!(coordinator.service().state(), ServiceState::Stopped);

    // The build finishes, but startup must not revive the service
    index.release();
    let err = bootstrap.await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Startup(_)));
    assert_eq!(coordinator.service().state(), ServiceState::Stopped);
    assert!(matches!(
        coordinator.search("mouse").await.unwrap_err(),
        Error::Unavailable(_)
    ));

    // Nor can it be started again
    assert!(coordinator.bootstrap(0, 64).await.is_err());
    assert_eq!(coordinator.service().state(), ServiceState::Stopped);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_shutdowns_wait_for_index_release() {
    let (coordinator, index) = gated(5).await;
    index.gate_next_close();

    let first = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.shutdown().await })
    };
    index.wait_parked().await;

    let second = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.shutdown().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!second.is_finished(), "second shutdown returned before the index was released");
    assert_eq!(coordinator.service().state(), ServiceState::Stopping);

    index.release();
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();
    assert_eq!(coordinator.service().state(), ServiceState::Stopped);
}
