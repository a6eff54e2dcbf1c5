//! Test utilities for API server integration tests

use axum_test::TestServer;
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};
use std::sync::Arc;
use stockcast::core::http::{create_router, AppState};
use stockcast::db::Storage;
use stockcast::forecasting::{
    ConfidenceMode, ForecastOrchestrator, ForecastPersister, OrchestratorConfig,
};
use stockcast::metrics::Metrics;
use stockcast::services::PredictionStrategy;

/// Test helper for API server integration tests
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub metrics: Arc<Metrics>,
    pub storage: Storage,
}

#[allow(dead_code)]
impl TestApiServer {
    pub async fn new() -> Self {
        Self::build(None)
    }

    pub async fn with_strategy(strategy: Arc<dyn PredictionStrategy>) -> Self {
        Self::build(Some(strategy))
    }

    fn build(strategy: Option<Arc<dyn PredictionStrategy>>) -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let storage = Storage::in_memory();

        let mut orchestrator = ForecastOrchestrator::new(OrchestratorConfig {
            prediction_timeout: std::time::Duration::from_secs(2),
            ..OrchestratorConfig::default()
        })
        .with_metrics(metrics.clone());
        if let Some(strategy) = strategy {
            orchestrator = orchestrator.with_primary(strategy);
        }
        let persister = ForecastPersister::new(storage.forecasts.clone(), ConfidenceMode::default());

        let state = AppState::new(storage.clone(), orchestrator, persister, metrics.clone(), 1000);
        let app = create_router(state);
        let server = TestServer::new(app).expect("start test server");

        Self {
            server,
            metrics,
            storage,
        }
    }
}

/// JSON import payload: one sale per consecutive day from 2024-01-01 at noon UTC
#[allow(dead_code)]
pub fn daily_sales_payload(item: &str, quantities: &[u32]) -> Value {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    let records: Vec<Value> = quantities
        .iter()
        .enumerate()
        .map(|(i, quantity)| {
            let day = start + Duration::days(i as i64);
            json!({
                "date": format!("{}T12:00:00Z", day),
                "item": item,
                "quantity": quantity,
                "unit": "lb",
                "priceInCents": 250
            })
        })
        .collect();
    Value::Array(records)
}

/// 30 days whose 7/7/7/9 blocks average 10, 20, 30 and 40
#[allow(dead_code)]
pub fn block_quantities() -> Vec<u32> {
    let mut quantities = vec![10; 7];
    quantities.extend([20; 7]);
    quantities.extend([30; 7]);
    quantities.extend([40; 9]);
    quantities
}
