//! Confidence scoring for persisted forecasts

use std::str::FromStr;

use super::grouping::DailyAggregate;

pub const DEFAULT_CONFIDENCE: u8 = 75;
const MIN_VARIANCE_CONFIDENCE: f64 = 0.3;
const MAX_VARIANCE_CONFIDENCE: f64 = 0.8;

/// How the 0-100 confidence on a forecast is derived. One mode per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceMode {
    /// Same score for every forecast
    Fixed(u8),
    /// `1 - coefficient of variation` of daily totals, clamped to [0.3, 0.8]
    Variance,
}

impl Default for ConfidenceMode {
    fn default() -> Self {
        ConfidenceMode::Fixed(DEFAULT_CONFIDENCE)
    }
}

impl FromStr for ConfidenceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(ConfidenceMode::default()),
            "variance" => Ok(ConfidenceMode::Variance),
            other => Err(format!("unknown confidence mode: {}", other)),
        }
    }
}

impl ConfidenceMode {
    pub fn score(&self, daily: &[DailyAggregate]) -> u8 {
        match *self {
            ConfidenceMode::Fixed(value) => value.min(100),
            ConfidenceMode::Variance => variance_confidence(daily),
        }
    }
}

fn variance_confidence(daily: &[DailyAggregate]) -> u8 {
    let floor = (MIN_VARIANCE_CONFIDENCE * 100.0).round() as u8;
    if daily.len() < 2 {
        return floor;
    }

    let n = daily.len() as f64;
    let mean = daily.iter().map(|d| d.total_quantity as f64).sum::<f64>() / n;
    if mean <= 0.0 {
        return floor;
    }

    let variance = daily
        .iter()
        .map(|d| (d.total_quantity as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let cv = variance.sqrt() / mean;

    let confidence = (1.0 - cv).clamp(MIN_VARIANCE_CONFIDENCE, MAX_VARIANCE_CONFIDENCE);
    (confidence * 100.0).round() as u8
}
