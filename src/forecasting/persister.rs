//! Turns predictions into stored forecast records

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::confidence::ConfidenceMode;
use super::grouping::{aggregate_daily, group_by_item, ItemHistory};
use crate::db::{ForecastRepository, RepositoryError};
use crate::models::{Forecast, ForecastBasis, ForecastResult, NewForecast, SalesRecord, Weather};

pub const FORECAST_PERIOD_DAYS: u32 = 1;
pub const FORECAST_TYPE: &str = "daily";

pub struct ForecastPersister {
    repository: Arc<dyn ForecastRepository>,
    confidence: ConfidenceMode,
}

impl ForecastPersister {
    pub fn new(repository: Arc<dyn ForecastRepository>, confidence: ConfidenceMode) -> Self {
        Self {
            repository,
            confidence,
        }
    }

    pub fn confidence_mode(&self) -> ConfidenceMode {
        self.confidence
    }

    /// Build the record for one prediction; `history` is that item's raw sales
    pub fn build_forecast(
        &self,
        result: &ForecastResult,
        history: &[SalesRecord],
        weather: Weather,
        now: DateTime<Utc>,
    ) -> NewForecast {
        let daily = aggregate_daily(history);
        let quantity = result.predicted_quantity;

        NewForecast {
            forecast_date: now + Duration::days(1),
            item: result.item.clone(),
            predicted_quantity: quantity,
            confidence: self.confidence.score(&daily),
            current_stock: None,
            predicted_savings_in_cents: None,
            based_on_data: ForecastBasis {
                data_points: history.len(),
                forecast_period: FORECAST_PERIOD_DAYS,
                reasoning: format!(
                    "1-day prediction for tomorrow: {} units (weather: {})",
                    quantity, weather
                ),
                recommended_order_quantity: quantity,
                forecast_type: FORECAST_TYPE.to_string(),
                weather,
                method: result.method,
            },
        }
    }

    /// Store one forecast per result, in order. A failure stops the batch; forecasts
    /// already written stay written.
    pub async fn persist(
        &self,
        results: &[ForecastResult],
        records: &[SalesRecord],
        weather: Weather,
    ) -> Result<Vec<Forecast>, RepositoryError> {
        let groups = group_by_item(records);
        let histories: HashMap<&str, &ItemHistory> =
            groups.iter().map(|g| (g.item.as_str(), g)).collect();

        let now = Utc::now();
        let mut saved = Vec::with_capacity(results.len());

        for result in results {
            let history = histories
                .get(result.item.as_str())
                .map(|g| g.records.as_slice())
                .unwrap_or(&[]);
            let forecast = self.build_forecast(result, history, weather, now);
            let stored = self.repository.save_forecast(forecast).await?;
            debug!(item = %stored.item, id = %stored.id, "Stored forecast");
            saved.push(stored);
        }

        Ok(saved)
    }
}
