//! Unit tests for the in-process storage backend

use chrono::{DateTime, Utc};
use stockcast::db::{MemoryStore, SalesRepository};
use stockcast::models::NewSalesRecord;

use crate::common_fixtures::at;

fn new_sale(item: &str, timestamp: &str, quantity: u32) -> NewSalesRecord {
    NewSalesRecord::new(at(timestamp), item, quantity, "lb", 199)
}

fn utc(timestamp: &str) -> DateTime<Utc> {
    at(timestamp).with_timezone(&Utc)
}

#[test]
fn test_invalid_record_rejects_whole_batch() {
    tokio_test::block_on(async {
        let store = MemoryStore::new();
        let batch = vec![
            new_sale("Tomatoes", "2024-05-01T09:00:00Z", 3),
            new_sale("Onions", "2024-05-01T09:00:00Z", 0),
        ];

        assert!(store.insert_sales(batch).await.is_err());
        assert!(store.get_recent_sales(10).await.unwrap().is_empty());
    });
}

#[test]
fn test_insert_assigns_ids() {
    tokio_test::block_on(async {
        let store = MemoryStore::new();
        let stored = store
            .insert_sales(vec![
                new_sale("Tomatoes", "2024-05-01T09:00:00Z", 3),
                new_sale("Tomatoes", "2024-05-01T09:00:00Z", 3),
            ])
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert_ne!(stored[0].id, stored[1].id);
    });
}

#[test]
fn test_recent_sales_newest_first_with_limit() {
    tokio_test::block_on(async {
        let store = MemoryStore::new();
        store
            .insert_sales(vec![
                new_sale("Tomatoes", "2024-05-01T09:00:00Z", 1),
                new_sale("Tomatoes", "2024-05-03T09:00:00Z", 3),
                new_sale("Onions", "2024-05-02T09:00:00Z", 2),
            ])
            .await
            .unwrap();

        let recent = store.get_recent_sales(2).await.unwrap();
        let quantities: Vec<u32> = recent.iter().map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![3, 2]);
    });
}

#[test]
fn test_sales_by_item_is_exact_match() {
    tokio_test::block_on(async {
        let store = MemoryStore::new();
        store
            .insert_sales(vec![
                new_sale("Tomatoes", "2024-05-01T09:00:00Z", 1),
                new_sale("Cherry Tomatoes", "2024-05-01T09:00:00Z", 2),
                new_sale("tomatoes", "2024-05-01T09:00:00Z", 3),
            ])
            .await
            .unwrap();

        let matches = store.get_sales_by_item("Tomatoes").await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].quantity, 1);
    });
}

#[test]
fn test_date_range_is_inclusive() {
    tokio_test::block_on(async {
        let store = MemoryStore::new();
        store
            .insert_sales(vec![
                new_sale("Tomatoes", "2024-05-01T00:00:00Z", 1),
                new_sale("Tomatoes", "2024-05-02T12:00:00Z", 2),
                new_sale("Tomatoes", "2024-05-03T00:00:00Z", 3),
                new_sale("Tomatoes", "2024-05-03T00:00:01Z", 4),
            ])
            .await
            .unwrap();

        let in_range = store
            .get_sales_by_date_range(utc("2024-05-01T00:00:00Z"), utc("2024-05-03T00:00:00Z"))
            .await
            .unwrap();
        let quantities: Vec<u32> = in_range.iter().map(|r| r.quantity).collect();
        assert_eq!(quantities, vec![3, 2, 1]);
    });
}

#[test]
fn test_date_range_compares_instants_across_offsets() {
    tokio_test::block_on(async {
        let store = MemoryStore::new();
        store
            .insert_sales(vec![new_sale("Tomatoes", "2024-05-01T20:00:00-05:00", 7)])
            .await
            .unwrap();

        let found = store
            .get_sales_by_date_range(utc("2024-05-02T00:00:00Z"), utc("2024-05-02T02:00:00Z"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date.to_rfc3339(), "2024-05-01T20:00:00-05:00");
    });
}

#[test]
fn test_forecasts_most_recent_first() {
    use stockcast::db::ForecastRepository;
    use stockcast::forecasting::{ConfidenceMode, ForecastPersister};
    use stockcast::models::{ForecastMethod, ForecastResult, Weather};

    tokio_test::block_on(async {
        let store = std::sync::Arc::new(MemoryStore::new());
        assert!(store.get_latest_forecast().await.unwrap().is_none());

        let persister = ForecastPersister::new(store.clone(), ConfidenceMode::default());
        for (item, quantity) in [("Tomatoes", 4.0), ("Onions", 2.0), ("Basil", 1.5)] {
            let result = ForecastResult::new(item, quantity, ForecastMethod::Statistical);
            persister.persist(&[result], &[], Weather::Cloudy).await.unwrap();
        }

        let recent = store.get_recent_forecasts(2).await.unwrap();
        let items: Vec<&str> = recent.iter().map(|f| f.item.as_str()).collect();
        assert_eq!(items, vec!["Basil", "Onions"]);

        let latest = store.get_latest_forecast().await.unwrap().unwrap();
        assert_eq!(latest.item, "Basil");
    });
}

#[test]
fn test_in_memory_storage_reports_backend() {
    use stockcast::db::{Storage, StorageBackend};

    let storage = Storage::in_memory();
    assert_eq!(storage.backend, StorageBackend::Memory);
    assert_eq!(storage.backend.as_str(), "memory");
    assert_eq!(StorageBackend::Postgres.to_string(), "postgres");
}
