//! Per-item grouping and per-day aggregation of raw sales

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::models::SalesRecord;

/// All sales for one item, in the order they were supplied
#[derive(Debug, Clone, PartialEq)]
pub struct ItemHistory {
    pub item: String,
    pub records: Vec<SalesRecord>,
}

/// Summed quantity for one item on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub total_quantity: u64,
}

impl DailyAggregate {
    /// `YYYY-MM-DD`
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Group records by exact item name. Items appear in first-seen order.
pub fn group_by_item(records: &[SalesRecord]) -> Vec<ItemHistory> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<ItemHistory> = Vec::new();

    for record in records {
        match index.get(record.item.as_str()) {
            Some(&position) => groups[position].records.push(record.clone()),
            None => {
                index.insert(record.item.as_str(), groups.len());
                groups.push(ItemHistory {
                    item: record.item.clone(),
                    records: vec![record.clone()],
                });
            }
        }
    }

    groups
}

/// Collapse one item's records into daily totals, oldest day first.
///
/// The day is taken from the record's own wall-clock date, so a late-evening sale
/// recorded at -05:00 stays on its local day even though it is the next day in UTC.
pub fn aggregate_daily(records: &[SalesRecord]) -> Vec<DailyAggregate> {
    let mut sorted: Vec<&SalesRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let mut totals: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in sorted {
        *totals.entry(record.calendar_day()).or_insert(0) += u64::from(record.quantity);
    }

    totals
        .into_iter()
        .map(|(date, total_quantity)| DailyAggregate {
            date,
            total_quantity,
        })
        .collect()
}
