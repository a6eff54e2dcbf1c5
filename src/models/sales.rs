//! Sales observations as fed by CSV ingestion or a POS import.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("item name must not be empty")]
    EmptyItem,
    #[error("quantity must be positive for {item}")]
    NonPositiveQuantity { item: String },
    #[error("price must be non-negative for {item}, got {price_in_cents}")]
    NegativePrice { item: String, price_in_cents: i64 },
}

/// A stored, validated sale. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    pub id: Uuid,
    /// Sale timestamp in the offset it was recorded with
    pub date: DateTime<FixedOffset>,
    pub item: String,
    pub quantity: u32,
    pub unit: String,
    pub price_in_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl SalesRecord {
    /// Wall-clock calendar day of the sale, in the sale's own offset.
    pub fn calendar_day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// A sale awaiting validation and storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSalesRecord {
    /// RFC 3339 timestamp, or a bare `YYYY-MM-DD` read as midnight UTC
    #[serde(deserialize_with = "deserialize_sale_date")]
    pub date: DateTime<FixedOffset>,
    pub item: String,
    pub quantity: u32,
    pub unit: String,
    pub price_in_cents: i64,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewSalesRecord {
    pub fn new(
        date: DateTime<FixedOffset>,
        item: impl Into<String>,
        quantity: u32,
        unit: impl Into<String>,
        price_in_cents: i64,
    ) -> Self {
        Self {
            date,
            item: item.into(),
            quantity,
            unit: unit.into(),
            price_in_cents,
            supplier: None,
            category: None,
        }
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.item.trim().is_empty() {
            return Err(ValidationError::EmptyItem);
        }
        if self.quantity == 0 {
            return Err(ValidationError::NonPositiveQuantity {
                item: self.item.clone(),
            });
        }
        if self.price_in_cents < 0 {
            return Err(ValidationError::NegativePrice {
                item: self.item.clone(),
                price_in_cents: self.price_in_cents,
            });
        }
        Ok(())
    }

    /// Validate and stamp with a fresh id and upload time
    pub fn into_record(self) -> Result<SalesRecord, ValidationError> {
        self.validate()?;
        Ok(SalesRecord {
            id: Uuid::new_v4(),
            date: self.date,
            item: self.item,
            quantity: self.quantity,
            unit: self.unit,
            price_in_cents: self.price_in_cents,
            supplier: self.supplier.filter(|s| !s.trim().is_empty()),
            category: self.category.filter(|c| !c.trim().is_empty()),
            uploaded_at: Utc::now(),
        })
    }
}

/// Parse a sale date given either as an RFC 3339 timestamp or as a calendar day
pub fn parse_sale_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp);
    }
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let utc = FixedOffset::east_opt(0)?;
    Some(DateTime::from_naive_utc_and_offset(day.and_hms_opt(0, 0, 0)?, utc))
}

fn deserialize_sale_date<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_sale_date(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid date '{}', expected RFC 3339 or YYYY-MM-DD",
            raw
        ))
    })
}
