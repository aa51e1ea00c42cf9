use proptest::prelude::*;
use reg_pol::{decode, encode, PolicyRecord, RegistryValueKind, ValueData};

/// Text without NUL, `;` or `]` so it is valid in name fields.
fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 _.\\\\*\u{e9}\u{4e2d}\u{1F600}-]{0,24}"
}

fn text_strategy() -> impl Strategy<Value = String> {
    any::<String>().prop_map(|s| s.replace('\0', ""))
}

fn multi_strategy() -> impl Strategy<Value = Vec<String>> {
    // A lone empty string shares its encoding with the empty list.
    prop::collection::vec(text_strategy(), 0..6)
        .prop_filter("single empty item", |items| !(items.len() == 1 && items[0].is_empty()))
}

fn data_strategy() -> impl Strategy<Value = (RegistryValueKind, ValueData)> {
    prop_oneof![
        text_strategy().prop_map(|s| (RegistryValueKind::String, ValueData::String(s))),
        text_strategy().prop_map(|s| (RegistryValueKind::ExpandString, ValueData::String(s))),
        multi_strategy().prop_map(|v| (RegistryValueKind::MultiString, ValueData::MultiString(v))),
        prop::collection::vec(any::<u8>(), 1..64)
            .prop_map(|b| (RegistryValueKind::Binary, ValueData::Binary(b))),
        any::<i32>().prop_map(|d| (RegistryValueKind::Dword, ValueData::Dword(d))),
        any::<i64>().prop_map(|q| (RegistryValueKind::Qword, ValueData::Qword(q))),
        Just((RegistryValueKind::None, ValueData::None)),
    ]
}

fn record_strategy() -> impl Strategy<Value = PolicyRecord> {
    ("[A-Za-z][A-Za-z0-9\\\\ ]{0,40}", name_strategy(), data_strategy()).prop_map(
        |(key, value, (kind, data))| {
            PolicyRecord::new(key, value, kind, data).expect("generated record is valid")
        },
    )
}

proptest! {
    #[test]
    fn prop_roundtrip_records(records in prop::collection::vec(record_strategy(), 0..16)) {
        let bytes = encode(&records).unwrap();
        let (decoded, consumed) = decode(&bytes).unwrap();

        prop_assert_eq!(consumed, bytes.len());
        prop_assert_eq!(decoded, records);
    }

    #[test]
    fn prop_encode_is_idempotent(records in prop::collection::vec(record_strategy(), 0..8)) {
        prop_assert_eq!(encode(&records).unwrap(), encode(&records).unwrap());
    }

    #[test]
    fn prop_reencode_decoded_is_stable(records in prop::collection::vec(record_strategy(), 1..8)) {
        let bytes = encode(&records).unwrap();
        let (decoded, _) = decode(&bytes).unwrap();
        prop_assert_eq!(encode(&decoded).unwrap(), bytes);
    }

    #[test]
    fn prop_decode_never_panics(tail in prop::collection::vec(any::<u8>(), 0..128)) {
        let mut bytes = b"PReg\x01\x00\x00\x00".to_vec();
        bytes.extend_from_slice(&tail);
        let _ = decode(&bytes);
    }
}
