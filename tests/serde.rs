//! Serialization of records when the `serde` feature is enabled.
#![cfg(feature = "serde")]

use reg_pol::{PolicyRecord, RegistryValueKind, ValueData};

#[test]
fn test_record_json_roundtrip() {
    let record = PolicyRecord::new(
        r"Software\Policies\Test",
        "List",
        RegistryValueKind::MultiString,
        ValueData::MultiString(vec!["a".into(), "b".into()]),
    )
    .unwrap();

    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("MultiString"));

    let back: PolicyRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}
