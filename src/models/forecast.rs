use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::weather::Weather;

/// Which strategy produced a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    Ai,
    Statistical,
    RecencyWeighted,
}

impl ForecastMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ForecastMethod::Ai => "ai",
            ForecastMethod::Statistical => "statistical",
            ForecastMethod::RecencyWeighted => "recency_weighted",
        }
    }
}

/// Next-day prediction for one item, before persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub item: String,
    pub predicted_quantity: f64,
    pub method: ForecastMethod,
}

impl ForecastResult {
    pub fn new(item: impl Into<String>, predicted_quantity: f64, method: ForecastMethod) -> Self {
        Self {
            item: item.into(),
            predicted_quantity,
            method,
        }
    }
}

/// Provenance stored alongside each forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastBasis {
    pub data_points: usize,
    pub forecast_period: u32,
    pub reasoning: String,
    pub recommended_order_quantity: f64,
    pub forecast_type: String,
    pub weather: Weather,
    pub method: ForecastMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewForecast {
    pub forecast_date: DateTime<Utc>,
    pub item: String,
    pub predicted_quantity: f64,
    /// 0-100
    pub confidence: u8,
    pub current_stock: Option<i64>,
    pub predicted_savings_in_cents: Option<i64>,
    pub based_on_data: ForecastBasis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub id: Uuid,
    pub forecast_date: DateTime<Utc>,
    pub item: String,
    pub predicted_quantity: f64,
    pub confidence: u8,
    pub current_stock: Option<i64>,
    pub predicted_savings_in_cents: Option<i64>,
    pub based_on_data: ForecastBasis,
    pub created_at: DateTime<Utc>,
}

impl Forecast {
    /// Stamp a new forecast with a generated id and creation time
    pub fn from_new(forecast: NewForecast) -> Self {
        Self {
            id: Uuid::new_v4(),
            forecast_date: forecast.forecast_date,
            item: forecast.item,
            predicted_quantity: forecast.predicted_quantity,
            confidence: forecast.confidence,
            current_stock: forecast.current_stock,
            predicted_savings_in_cents: forecast.predicted_savings_in_cents,
            based_on_data: forecast.based_on_data,
            created_at: Utc::now(),
        }
    }
}
