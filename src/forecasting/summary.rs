//! Compact tabular view of sales history sent to the AI strategy

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::SalesRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub date: NaiveDate,
    pub item: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    /// Oldest first
    pub rows: Vec<SummaryRow>,
    pub total_records: usize,
}

impl SalesSummary {
    /// Keep the `max_rows` most recent sales
    pub fn from_records(records: &[SalesRecord], max_rows: usize) -> Self {
        let mut sorted: Vec<&SalesRecord> = records.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted.truncate(max_rows);
        sorted.reverse();

        let rows = sorted
            .into_iter()
            .map(|r| SummaryRow {
                date: r.calendar_day(),
                item: r.item.clone(),
                quantity: r.quantity,
            })
            .collect();

        Self {
            rows,
            total_records: records.len(),
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.total_records
    }

    /// `date,item,quantity` lines with a header
    pub fn to_table(&self) -> String {
        let mut table = String::from("date,item,quantity\n");
        for row in &self.rows {
            table.push_str(&format!(
                "{},{},{}\n",
                row.date.format("%Y-%m-%d"),
                row.item.replace(',', " "),
                row.quantity
            ));
        }
        table
    }
}
