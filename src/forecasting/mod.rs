//! Forecasting engine: grouping, strategies, orchestration and persistence.

pub mod confidence;
pub mod grouping;
pub mod orchestrator;
pub mod persister;
pub mod recency;
pub mod statistical;
pub mod summary;
pub mod validation;

pub use confidence::ConfidenceMode;
pub use grouping::{aggregate_daily, group_by_item, DailyAggregate, ItemHistory};
pub use orchestrator::{FallbackReason, ForecastError, ForecastOrchestrator, OrchestratorConfig};
pub use persister::ForecastPersister;
pub use recency::RecencyWeightedForecaster;
pub use statistical::{BlockWeighting, StatisticalForecaster, WeightedBlock};
pub use summary::{SalesSummary, SummaryRow};
pub use validation::{validate_prediction_payload, SchemaError};

/// Round to two decimal places, never below zero
pub fn round_quantity(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}
