//! Unit tests for forecast persistence

use chrono::{Duration, Utc};
use std::sync::Arc;
use stockcast::db::{ForecastRepository, MemoryStore};
use stockcast::forecasting::{ConfidenceMode, ForecastPersister};
use stockcast::models::{ForecastMethod, ForecastResult, Weather};

use crate::common_fixtures::daily_sales;

#[test]
fn test_build_forecast_fields() {
    let store = Arc::new(MemoryStore::new());
    let persister = ForecastPersister::new(store, ConfidenceMode::default());
    let history = daily_sales("Tomatoes", &[5; 12]);
    let result = ForecastResult::new("Tomatoes", 21.6, ForecastMethod::Statistical);
    let now = Utc::now();

    let forecast = persister.build_forecast(&result, &history, Weather::Sunny, now);

    assert_eq!(forecast.forecast_date, now + Duration::days(1));
    assert_eq!(forecast.item, "Tomatoes");
    assert_eq!(forecast.predicted_quantity, 21.6);
    assert_eq!(forecast.confidence, 75);
    assert!(forecast.current_stock.is_none());
    assert!(forecast.predicted_savings_in_cents.is_none());

    let basis = &forecast.based_on_data;
    assert_eq!(basis.data_points, 12);
    assert_eq!(basis.forecast_period, 1);
    assert_eq!(basis.forecast_type, "daily");
    assert_eq!(basis.recommended_order_quantity, 21.6);
    assert_eq!(basis.weather, Weather::Sunny);
    assert_eq!(basis.method, ForecastMethod::Statistical);
    assert_eq!(
        basis.reasoning,
        "1-day prediction for tomorrow: 21.6 units (weather: sunny)"
    );
}

#[test]
fn test_variance_confidence() {
    let store = Arc::new(MemoryStore::new());
    let persister = ForecastPersister::new(store, ConfidenceMode::Variance);
    let history = daily_sales("Tomatoes", &[10; 14]);
    let result = ForecastResult::new("Tomatoes", 10.0, ForecastMethod::Statistical);

    let forecast = persister.build_forecast(&result, &history, Weather::Cloudy, Utc::now());
    assert_eq!(forecast.confidence, 80);
}

#[tokio::test]
async fn test_persist_stores_one_forecast_per_result() {
    let store = Arc::new(MemoryStore::new());
    let persister = ForecastPersister::new(store.clone(), ConfidenceMode::default());

    let mut records = daily_sales("Tomatoes", &[5; 30]);
    records.extend(daily_sales("Onions", &[2; 31]));
    let results = vec![
        ForecastResult::new("Tomatoes", 5.0, ForecastMethod::Statistical),
        ForecastResult::new("Onions", 2.0, ForecastMethod::Statistical),
    ];

    let saved = persister
        .persist(&results, &records, Weather::Cloudy)
        .await
        .unwrap();

    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].item, "Tomatoes");
    assert_eq!(saved[0].based_on_data.data_points, 30);
    assert_eq!(saved[1].based_on_data.data_points, 31);
    assert_ne!(saved[0].id, saved[1].id);

    let stored = store.get_recent_forecasts(10).await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_repeated_runs_are_not_deduplicated() {
    let store = Arc::new(MemoryStore::new());
    let persister = ForecastPersister::new(store.clone(), ConfidenceMode::default());
    let records = daily_sales("Tomatoes", &[5; 30]);
    let results = vec![ForecastResult::new("Tomatoes", 5.0, ForecastMethod::Statistical)];

    let first = persister.persist(&results, &records, Weather::Cloudy).await.unwrap();
    let second = persister.persist(&results, &records, Weather::Cloudy).await.unwrap();

    assert_ne!(first[0].id, second[0].id);
    assert_eq!(store.get_recent_forecasts(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_ai_result_without_history_has_zero_data_points() {
    let store = Arc::new(MemoryStore::new());
    let persister = ForecastPersister::new(store, ConfidenceMode::default());
    let records = daily_sales("Tomatoes", &[5; 30]);
    let results = vec![ForecastResult::new("Basil", 3.0, ForecastMethod::Ai)];

    let saved = persister.persist(&results, &records, Weather::Cloudy).await.unwrap();
    assert_eq!(saved[0].based_on_data.data_points, 0);
    assert_eq!(saved[0].based_on_data.method, ForecastMethod::Ai);
}
