//! Tests for aou-model record types.

use aou_model::{OutputRecord, RawRecord, RawValue};

#[test]
fn raw_record_deserializes_from_resource() {
    let record: RawRecord = serde_json::from_str(
        r#"{"participantId": "P123", "numCompletedBaselinePPIModules": 3, "sex": "UNSET"}"#,
    )
    .expect("deserialize resource");
    assert_eq!(record.participant_id(), Some("P123"));
    assert_eq!(
        record.get("numCompletedBaselinePPIModules"),
        Some(&RawValue::Integer(3))
    );
    assert!(record.get("sex").is_some_and(RawValue::is_unset));
    assert!(record.get("streetAddress2").is_none());
}

#[test]
fn output_record_keeps_insertion_order() {
    let mut record = OutputRecord::new();
    record.set("PMI ID", "P1");
    record.set("Last Name", "Doe");
    record.set("First Name", "Jane");
    record.set("Last Name", "Roe");

    let columns: Vec<&str> = record.columns().collect();
    assert_eq!(columns, vec!["PMI ID", "Last Name", "First Name"]);
    assert_eq!(record.get("Last Name"), Some("Roe"));
    assert_eq!(record.len(), 3);
}

#[test]
fn output_record_serializes_as_ordered_map() {
    let record: OutputRecord = [("b", "2"), ("a", "1")].into_iter().collect();
    let json = serde_json::to_string(&record).expect("serialize record");
    assert_eq!(json, r#"{"b":"2","a":"1"}"#);
}
