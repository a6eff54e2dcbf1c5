//! Value rollups over stored sales for the reporting endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::sales::SalesRecord;

/// Entries kept in each ranking
pub const TOP_ENTRIES: usize = 5;
const UNKNOWN_SUPPLIER: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemTotal {
    pub item: String,
    pub quantity: u64,
    /// Sum of price x quantity, in cents
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierTotal {
    pub supplier: String,
    pub orders: usize,
    pub value: i64,
}

/// Totals, covered dates and the highest-value items and suppliers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub total_records: usize,
    pub total_value: i64,
    pub date_range: Option<DateRange>,
    pub top_items: Vec<ItemTotal>,
    pub top_suppliers: Vec<SupplierTotal>,
}

impl SalesReport {
    pub fn from_records(records: &[SalesRecord]) -> Self {
        let date_range = records
            .iter()
            .map(|r| r.date.with_timezone(&Utc))
            .fold(None, |range: Option<DateRange>, instant| match range {
                None => Some(DateRange {
                    start: instant,
                    end: instant,
                }),
                Some(range) => Some(DateRange {
                    start: range.start.min(instant),
                    end: range.end.max(instant),
                }),
            });

        let mut items: Vec<ItemTotal> = Vec::new();
        let mut item_index: HashMap<&str, usize> = HashMap::new();
        let mut suppliers: Vec<SupplierTotal> = Vec::new();
        let mut supplier_index: HashMap<&str, usize> = HashMap::new();
        let mut total_value = 0i64;

        for record in records {
            let value = line_value(record);
            total_value = total_value.saturating_add(value);

            let slot = *item_index.entry(record.item.as_str()).or_insert_with(|| {
                items.push(ItemTotal {
                    item: record.item.clone(),
                    quantity: 0,
                    value: 0,
                });
                items.len() - 1
            });
            items[slot].quantity += u64::from(record.quantity);
            items[slot].value = items[slot].value.saturating_add(value);

            let supplier = record.supplier.as_deref().unwrap_or(UNKNOWN_SUPPLIER);
            let slot = *supplier_index.entry(supplier).or_insert_with(|| {
                suppliers.push(SupplierTotal {
                    supplier: supplier.to_string(),
                    orders: 0,
                    value: 0,
                });
                suppliers.len() - 1
            });
            suppliers[slot].orders += 1;
            suppliers[slot].value = suppliers[slot].value.saturating_add(value);
        }

        // Stable sorts: equal values keep first-seen order
        items.sort_by(|a, b| b.value.cmp(&a.value));
        items.truncate(TOP_ENTRIES);
        suppliers.sort_by(|a, b| b.value.cmp(&a.value));
        suppliers.truncate(TOP_ENTRIES);

        Self {
            total_records: records.len(),
            total_value,
            date_range,
            top_items: items,
            top_suppliers: suppliers,
        }
    }
}

fn line_value(record: &SalesRecord) -> i64 {
    record
        .price_in_cents
        .saturating_mul(i64::from(record.quantity))
}
