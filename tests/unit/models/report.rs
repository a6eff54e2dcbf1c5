//! Unit tests for the sales value report

use stockcast::models::{NewSalesRecord, SalesRecord, SalesReport};

use crate::common_fixtures::at;

fn priced(item: &str, ts: &str, quantity: u32, price: i64, supplier: Option<&str>) -> SalesRecord {
    let mut record = NewSalesRecord::new(at(ts), item, quantity, "lb", price);
    if let Some(supplier) = supplier {
        record = record.with_supplier(supplier);
    }
    record.into_record().unwrap()
}

#[test]
fn test_empty_report() {
    let report = SalesReport::from_records(&[]);
    assert_eq!(report.total_records, 0);
    assert_eq!(report.total_value, 0);
    assert!(report.date_range.is_none());
    assert!(report.top_items.is_empty());
    assert!(report.top_suppliers.is_empty());
}

#[test]
fn test_totals_and_rankings() {
    let records = vec![
        priced("Tomatoes", "2024-03-02T10:00:00Z", 4, 250, Some("Green Farms")),
        priced("Onions", "2024-03-01T10:00:00-05:00", 10, 50, None),
        priced("Tomatoes", "2024-03-03T10:00:00Z", 2, 300, Some("Green Farms")),
        priced("Basil", "2024-03-01T09:00:00Z", 1, 2000, Some("Herb Co")),
    ];

    let report = SalesReport::from_records(&records);
    assert_eq!(report.total_records, 4);
    // 1000 + 500 + 600 + 2000
    assert_eq!(report.total_value, 4100);

    let range = report.date_range.unwrap();
    assert_eq!(range.start, at("2024-03-01T09:00:00Z"));
    assert_eq!(range.end, at("2024-03-03T10:00:00Z"));

    let items: Vec<(&str, u64, i64)> = report
        .top_items
        .iter()
        .map(|t| (t.item.as_str(), t.quantity, t.value))
        .collect();
    assert_eq!(
        items,
        vec![("Basil", 1, 2000), ("Tomatoes", 6, 1600), ("Onions", 10, 500)]
    );

    let suppliers: Vec<(&str, usize, i64)> = report
        .top_suppliers
        .iter()
        .map(|s| (s.supplier.as_str(), s.orders, s.value))
        .collect();
    assert_eq!(
        suppliers,
        vec![("Herb Co", 1, 2000), ("Green Farms", 2, 1600), ("Unknown", 1, 500)]
    );
}

#[test]
fn test_rankings_keep_top_five() {
    let records: Vec<SalesRecord> = (1..=7)
        .map(|i| priced(&format!("Item {}", i), "2024-03-01T10:00:00Z", 1, i * 100, None))
        .collect();

    let report = SalesReport::from_records(&records);
    assert_eq!(report.top_items.len(), 5);
    assert_eq!(report.top_items[0].item, "Item 7");
    assert_eq!(report.top_items[4].item, "Item 3");
    assert_eq!(report.top_suppliers.len(), 1);
}
