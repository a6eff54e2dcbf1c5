//! Unit tests for sales record validation

use stockcast::models::{NewSalesRecord, ValidationError};

use crate::common_fixtures::at;

#[test]
fn test_valid_record_gets_id_and_upload_time() {
    let record = NewSalesRecord::new(at("2024-05-01T09:00:00+02:00"), "Tomatoes", 4, "lb", 325)
        .with_supplier("Green Farms")
        .with_category("Produce")
        .into_record()
        .unwrap();

    assert_eq!(record.item, "Tomatoes");
    assert_eq!(record.quantity, 4);
    assert_eq!(record.supplier.as_deref(), Some("Green Farms"));
    assert_eq!(record.category.as_deref(), Some("Produce"));
}

#[test]
fn test_zero_quantity_rejected() {
    let result = NewSalesRecord::new(at("2024-05-01T09:00:00Z"), "Basil", 0, "bunch", 100).validate();
    assert_eq!(
        result,
        Err(ValidationError::NonPositiveQuantity {
            item: "Basil".to_string()
        })
    );
}

#[test]
fn test_negative_price_rejected() {
    let result = NewSalesRecord::new(at("2024-05-01T09:00:00Z"), "Basil", 2, "bunch", -1).validate();
    assert!(matches!(result, Err(ValidationError::NegativePrice { .. })));
}

#[test]
fn test_blank_item_rejected() {
    let result = NewSalesRecord::new(at("2024-05-01T09:00:00Z"), "   ", 2, "bunch", 100).validate();
    assert_eq!(result, Err(ValidationError::EmptyItem));
}

#[test]
fn test_blank_supplier_dropped() {
    let record = NewSalesRecord::new(at("2024-05-01T09:00:00Z"), "Leeks", 2, "ea", 90)
        .with_supplier(" ")
        .into_record()
        .unwrap();
    assert!(record.supplier.is_none());
}

#[test]
fn test_deserializes_camel_case_with_offset() {
    let json = r#"{
        "date": "2024-05-01T23:45:00-05:00",
        "item": "Lettuce",
        "quantity": 3,
        "unit": "head",
        "priceInCents": 199
    }"#;
    let record: NewSalesRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.price_in_cents, 199);
    assert_eq!(record.date.offset().local_minus_utc(), -5 * 3600);
    assert!(record.supplier.is_none());
}

#[test]
fn test_date_only_sale_reads_as_midnight_utc() {
    let record: NewSalesRecord = serde_json::from_value(serde_json::json!({
        "date": "2024-01-05",
        "item": "Tomatoes",
        "quantity": 4,
        "unit": "lb",
        "priceInCents": 250
    }))
    .unwrap();

    assert_eq!(record.date, at("2024-01-05T00:00:00+00:00"));
    let stored = record.into_record().unwrap();
    assert_eq!(stored.calendar_day().to_string(), "2024-01-05");
}

#[test]
fn test_timestamp_sale_keeps_offset() {
    let record: NewSalesRecord = serde_json::from_value(serde_json::json!({
        "date": "2024-01-05T23:30:00-05:00",
        "item": "Tomatoes",
        "quantity": 4,
        "unit": "lb",
        "priceInCents": 250
    }))
    .unwrap();
    assert_eq!(record.date.to_rfc3339(), "2024-01-05T23:30:00-05:00");
}

#[test]
fn test_unparsable_sale_date_rejected() {
    let result: Result<NewSalesRecord, _> = serde_json::from_value(serde_json::json!({
        "date": "05/01/2024",
        "item": "Tomatoes",
        "quantity": 4,
        "unit": "lb",
        "priceInCents": 250
    }));
    let message = result.unwrap_err().to_string();
    assert!(message.contains("expected RFC 3339 or YYYY-MM-DD"), "{}", message);
}
