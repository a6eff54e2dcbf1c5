//! Strategy selection with graceful degradation.
//!
//! The AI strategy is tried first when one is configured. Any failure on that path
//! (transport, status, timeout, bad shape) is logged and absorbed, and the
//! deterministic forecasters answer instead. The only error a caller can see is an
//! empty input.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::grouping::group_by_item;
use super::recency::RecencyWeightedForecaster;
use super::statistical::StatisticalForecaster;
use super::summary::SalesSummary;
use super::validation::{validate_prediction_payload, SchemaError};
use crate::config::{Config, DEFAULT_PREDICTION_TIMEOUT_SECS, DEFAULT_SUMMARY_ROW_LIMIT};
use crate::metrics::Metrics;
use crate::models::{ForecastResult, SalesRecord, Weather};
use crate::services::prediction::{PredictionError, PredictionStrategy};

/// Errors surfaced to callers of [`ForecastOrchestrator::generate_forecasts`]
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("No sales data provided for forecasting")]
    NoSalesData,
}

/// Why the AI strategy's answer was not used
#[derive(Debug, thiserror::Error)]
pub enum FallbackReason {
    #[error(transparent)]
    Strategy(#[from] PredictionError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl FallbackReason {
    /// Label used in logs and the `prediction_fallbacks_total` metric
    pub fn class(&self) -> &'static str {
        match self {
            FallbackReason::Strategy(e) => e.class(),
            FallbackReason::Schema(_) => "schema",
        }
    }
}

/// Tuning for the AI attempt and the fallback path
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub prediction_timeout: Duration,
    pub summary_row_limit: usize,
    pub sparse_history_fallback: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            prediction_timeout: Duration::from_secs(DEFAULT_PREDICTION_TIMEOUT_SECS),
            summary_row_limit: DEFAULT_SUMMARY_ROW_LIMIT,
            sparse_history_fallback: false,
        }
    }
}

impl From<&Config> for OrchestratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            prediction_timeout: config.prediction_timeout,
            summary_row_limit: config.summary_row_limit,
            sparse_history_fallback: config.sparse_history_fallback,
        }
    }
}

/// Picks the forecasting strategy for each run. Holds no per-request state.
pub struct ForecastOrchestrator {
    primary: Option<Arc<dyn PredictionStrategy>>,
    statistical: StatisticalForecaster,
    recency: Option<RecencyWeightedForecaster>,
    config: OrchestratorConfig,
    metrics: Option<Arc<Metrics>>,
}

impl ForecastOrchestrator {
    /// Statistical-only orchestrator; attach an AI strategy with [`Self::with_primary`]
    pub fn new(config: OrchestratorConfig) -> Self {
        let recency = config
            .sparse_history_fallback
            .then(RecencyWeightedForecaster::new);
        Self {
            primary: None,
            statistical: StatisticalForecaster::new(),
            recency,
            config,
            metrics: None,
        }
    }

    /// Try this strategy before falling back to statistics
    pub fn with_primary(mut self, strategy: Arc<dyn PredictionStrategy>) -> Self {
        self.primary = Some(strategy);
        self
    }

    /// Replace the block-weighted forecaster used on the fallback path
    pub fn with_statistical(mut self, statistical: StatisticalForecaster) -> Self {
        self.statistical = statistical;
        self
    }

    /// Count generated forecasts and fallbacks
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Whether an AI strategy is attached
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Next-day forecasts for every item in `records`.
    ///
    /// Fails only on empty input. Any AI failure falls back to the statistical path.
    pub async fn generate_forecasts(
        &self,
        records: &[SalesRecord],
        weather: Weather,
    ) -> Result<Vec<ForecastResult>, ForecastError> {
        if records.is_empty() {
            return Err(ForecastError::NoSalesData);
        }

        match &self.primary {
            Some(strategy) => match self.attempt_primary(strategy.as_ref(), records, weather).await {
                Ok(results) => {
                    info!(
                        strategy = strategy.name(),
                        count = results.len(),
                        "AI strategy produced {} forecasts",
                        results.len()
                    );
                    self.record_generated(&results);
                    return Ok(results);
                }
                Err(reason) => {
                    warn!(
                        strategy = strategy.name(),
                        failure = reason.class(),
                        error = %reason,
                        "AI strategy failed, falling back to statistical forecasting"
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics
                            .prediction_fallbacks_total
                            .with_label_values(&[reason.class()])
                            .inc();
                    }
                }
            },
            None => debug!("No AI strategy configured, using statistical forecasting"),
        }

        let results = self.fallback(records, weather);
        info!(count = results.len(), weather = %weather, "Statistical forecasting produced {} forecasts", results.len());
        self.record_generated(&results);
        Ok(results)
    }

    async fn attempt_primary(
        &self,
        strategy: &dyn PredictionStrategy,
        records: &[SalesRecord],
        weather: Weather,
    ) -> Result<Vec<ForecastResult>, FallbackReason> {
        let summary = SalesSummary::from_records(records, self.config.summary_row_limit);
        if summary.is_truncated() {
            debug!(
                rows = summary.rows.len(),
                total = summary.total_records,
                "Truncated sales summary for AI request"
            );
        }

        let payload = tokio::time::timeout(
            self.config.prediction_timeout,
            strategy.predict(&summary, weather),
        )
        .await
        .map_err(|_| PredictionError::Timeout)??;

        Ok(validate_prediction_payload(&payload)?)
    }

    /// Block-weighted forecast per item, with the recency-weighted strategy filling
    /// in short histories when enabled.
    pub fn fallback(&self, records: &[SalesRecord], weather: Weather) -> Vec<ForecastResult> {
        group_by_item(records)
            .iter()
            .filter_map(|group| {
                self.statistical
                    .forecast_item(&group.item, &group.records, weather)
                    .or_else(|| {
                        self.recency
                            .as_ref()
                            .and_then(|r| r.forecast_item(&group.item, &group.records, weather))
                    })
            })
            .collect()
    }

    fn record_generated(&self, results: &[ForecastResult]) {
        if let Some(metrics) = &self.metrics {
            for result in results {
                metrics
                    .forecasts_generated_total
                    .with_label_values(&[result.method.as_str()])
                    .inc();
            }
        }
    }
}
