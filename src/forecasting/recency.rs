//! Linear recency-weighted forecaster for items with a short history.
//!
//! Only consulted for items the block-weighted forecaster skipped, and only when
//! sparse-history fallback is switched on.

use super::grouping::{aggregate_daily, DailyAggregate};
use super::round_quantity;
use crate::models::{ForecastMethod, ForecastResult, SalesRecord, Weather};

pub const MIN_DAYS: usize = 3;
pub const MAX_DAYS: usize = 29;

/// Lenient forecaster for items with 3 to 29 days of sales
#[derive(Debug, Clone)]
pub struct RecencyWeightedForecaster {
    min_days: usize,
    max_days: usize,
}

impl Default for RecencyWeightedForecaster {
    fn default() -> Self {
        Self {
            min_days: MIN_DAYS,
            max_days: MAX_DAYS,
        }
    }
}

impl RecencyWeightedForecaster {
    /// Forecaster with the default 3 to 29 day range
    pub fn new() -> Self {
        Self::default()
    }

    /// Forecast one item from its raw sales, or `None` below the minimum history
    pub fn forecast_item(
        &self,
        item: &str,
        records: &[SalesRecord],
        weather: Weather,
    ) -> Option<ForecastResult> {
        let daily = aggregate_daily(records);
        let average = self.weighted_average(&daily)?;
        let predicted = round_quantity(average * weather.multiplier());
        Some(ForecastResult::new(item, predicted, ForecastMethod::RecencyWeighted))
    }

    /// Newest day weighs `n`, oldest weighs 1
    pub fn weighted_average(&self, daily: &[DailyAggregate]) -> Option<f64> {
        if daily.len() < self.min_days {
            return None;
        }

        let start = daily.len().saturating_sub(self.max_days);
        let (weighted_sum, weight_total) = daily[start..]
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(sum, total), (i, day)| {
                let weight = (i + 1) as f64;
                (sum + day.total_quantity as f64 * weight, total + weight)
            });

        if weight_total == 0.0 {
            return None;
        }
        Some(weighted_sum / weight_total)
    }
}
