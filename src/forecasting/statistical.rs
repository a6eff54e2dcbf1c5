//! Block-weighted next-day forecaster.
//!
//! The most recent 30 days with sales are split oldest to newest into blocks of
//! 7/7/7/9 days weighted 0.50/0.30/0.10/0.10. The oldest block carries the most
//! weight: the long-run level is treated as steadier than last week's noise.

use tracing::debug;

use super::grouping::{aggregate_daily, group_by_item, DailyAggregate};
use super::round_quantity;
use crate::models::{ForecastMethod, ForecastResult, SalesRecord, Weather};

/// A run of consecutive days and its share of the forecast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedBlock {
    pub days: usize,
    pub weight: f64,
}

/// Block layout, listed oldest block first
#[derive(Debug, Clone, PartialEq)]
pub struct BlockWeighting {
    pub blocks: Vec<WeightedBlock>,
}

impl Default for BlockWeighting {
    fn default() -> Self {
        Self {
            blocks: vec![
                WeightedBlock { days: 7, weight: 0.50 },
                WeightedBlock { days: 7, weight: 0.30 },
                WeightedBlock { days: 7, weight: 0.10 },
                WeightedBlock { days: 9, weight: 0.10 },
            ],
        }
    }
}

impl BlockWeighting {
    /// Number of days with sales an item needs before it is forecast
    pub fn window_days(&self) -> usize {
        self.blocks.iter().map(|b| b.days).sum()
    }
}

/// Strict forecaster: items with fewer days than the window get no result
#[derive(Debug, Clone, Default)]
pub struct StatisticalForecaster {
    weighting: BlockWeighting,
}

impl StatisticalForecaster {
    /// Forecaster with the default 7/7/7/9 layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Forecaster with a custom block layout
    pub fn with_weighting(weighting: BlockWeighting) -> Self {
        Self { weighting }
    }

    /// Block layout in use
    pub fn weighting(&self) -> &BlockWeighting {
        &self.weighting
    }

    /// Forecast every item with enough history; the rest are left out.
    pub fn forecast(&self, records: &[SalesRecord], weather: Weather) -> Vec<ForecastResult> {
        group_by_item(records)
            .iter()
            .filter_map(|group| self.forecast_item(&group.item, &group.records, weather))
            .collect()
    }

    /// Forecast one item from its raw sales, or `None` if its history is too short
    pub fn forecast_item(
        &self,
        item: &str,
        records: &[SalesRecord],
        weather: Weather,
    ) -> Option<ForecastResult> {
        let daily = aggregate_daily(records);
        let Some(weighted) = self.weighted_average(&daily) else {
            debug!(
                item = %item,
                days = daily.len(),
                required = self.weighting.window_days(),
                "Skipping item with insufficient history"
            );
            return None;
        };

        let predicted = round_quantity(weighted * weather.multiplier());
        Some(ForecastResult::new(item, predicted, ForecastMethod::Statistical))
    }

    /// Weighted block average over the trailing window, before weather.
    ///
    /// `daily` must be oldest-first. Returns `None` when there are fewer days than
    /// the window covers.
    pub fn weighted_average(&self, daily: &[DailyAggregate]) -> Option<f64> {
        let window = self.weighting.window_days();
        if window == 0 || daily.len() < window {
            return None;
        }

        let recent = &daily[daily.len() - window..];
        let mut offset = 0;
        let mut weighted = 0.0;

        for block in &self.weighting.blocks {
            let days = &recent[offset..offset + block.days];
            offset += block.days;
            weighted += block_mean(days) * block.weight;
        }

        Some(weighted.max(0.0))
    }
}

/// Mean over the days present; an empty block contributes nothing
fn block_mean(days: &[DailyAggregate]) -> f64 {
    if days.is_empty() {
        return 0.0;
    }
    let sum: u64 = days.iter().map(|d| d.total_quantity).sum();
    sum as f64 / days.len() as f64
}
