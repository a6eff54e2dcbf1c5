//! Contract check for predictions returned by the AI strategy.
//!
//! The payload must be a non-empty JSON array of `{item, predictedQuantity}`
//! objects. Anything else is rejected as a whole.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use super::round_quantity;
use crate::models::{ForecastMethod, ForecastResult};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("prediction payload is not an array")]
    NotAnArray,
    #[error("prediction payload is empty")]
    Empty,
    #[error("prediction entry {index} is invalid: {reason}")]
    InvalidEntry { index: usize, reason: String },
    #[error("prediction entry {index} repeats item {item}")]
    DuplicateItem { index: usize, item: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictionEntry {
    item: String,
    predicted_quantity: f64,
}

pub fn validate_prediction_payload(payload: &Value) -> Result<Vec<ForecastResult>, SchemaError> {
    let entries = payload.as_array().ok_or(SchemaError::NotAnArray)?;
    if entries.is_empty() {
        return Err(SchemaError::Empty);
    }

    let mut seen = HashSet::new();
    let mut results = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let parsed: PredictionEntry =
            serde_json::from_value(entry.clone()).map_err(|e| SchemaError::InvalidEntry {
                index,
                reason: e.to_string(),
            })?;

        let item = parsed.item.trim();
        if item.is_empty() {
            return Err(SchemaError::InvalidEntry {
                index,
                reason: "item is empty".to_string(),
            });
        }
        if !seen.insert(item.to_string()) {
            return Err(SchemaError::DuplicateItem {
                index,
                item: item.to_string(),
            });
        }

        results.push(ForecastResult::new(
            item,
            round_quantity(parsed.predicted_quantity),
            ForecastMethod::Ai,
        ));
    }

    Ok(results)
}
