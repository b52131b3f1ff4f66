//! CSV codec round-trip tests.
//!
//! Encoding then decoding must preserve every modeled field for any record
//! set that satisfies the repository invariants, modulo regenerated identity.
//! The dialect cannot carry double quotes or newlines inside fields; the
//! strategies below stay within what it can represent.

use proptest::prelude::*;

use vision_records_core::csv::{decode, encode};
use vision_records_core::models::{EyeMeasurement, PatientRecord};

fn record(
    date: &str,
    name: &str,
    mobile: &str,
    right_eye: EyeMeasurement,
    left_eye: EyeMeasurement,
    frame_price: &str,
    glass_price: &str,
    remarks: &str,
) -> PatientRecord {
    PatientRecord {
        id: "test-id".into(),
        date: date.into(),
        name: name.into(),
        mobile: mobile.into(),
        right_eye,
        left_eye,
        frame_price: frame_price.into(),
        glass_price: glass_price.into(),
        remarks: remarks.into(),
        created_at: "2024-03-01T09:00:00+00:00".into(),
    }
}

fn assert_fields_preserved(original: &PatientRecord, decoded: &PatientRecord) {
    assert_eq!(original.date, decoded.date);
    assert_eq!(original.name, decoded.name);
    assert_eq!(original.mobile, decoded.mobile);
    assert_eq!(original.right_eye, decoded.right_eye);
    assert_eq!(original.left_eye, decoded.left_eye);
    assert_eq!(original.frame_price, decoded.frame_price);
    assert_eq!(original.glass_price, decoded.glass_price);
    assert_eq!(original.remarks, decoded.remarks);
}

#[test]
fn roundtrip_golden_records() {
    let full_eye = EyeMeasurement {
        sphere: "-1.25".into(),
        cylinder: "-0.50".into(),
        axis: "90".into(),
        add: "+2.00".into(),
    };

    let records = vec![
        record(
            "2024-03-01",
            "Asha Verma",
            "9771234567",
            full_eye.clone(),
            EyeMeasurement::default(),
            "1200",
            "800",
            "new frame",
        ),
        record(
            "2023-11-20",
            "Kumar, Ravi",
            "8881234567",
            EyeMeasurement::default(),
            full_eye,
            "0",
            "1500",
            "follow-up, bring old glasses",
        ),
        record(
            "2024-01-05",
            "O Connor",
            "7770001112",
            EyeMeasurement::default(),
            EyeMeasurement::default(),
            "0",
            "0",
            "plano",
        ),
    ];

    let decoded = decode(&encode(&records));

    assert_eq!(decoded.len(), records.len());
    for (original, decoded) in records.iter().zip(&decoded) {
        assert_fields_preserved(original, decoded);
    }
}

#[test]
fn roundtrip_regenerates_identity() {
    let records = vec![record(
        "2024-03-01",
        "Asha",
        "9771234567",
        EyeMeasurement::default(),
        EyeMeasurement::default(),
        "0",
        "0",
        "ok",
    )];

    let decoded = decode(&encode(&records));
    assert_ne!(decoded[0].id, records[0].id);
    assert!(decoded[0].id.starts_with("imported-"));
    assert_ne!(decoded[0].created_at, records[0].created_at);
}

#[test]
fn quote_in_field_does_not_survive() {
    // Known dialect limitation: the scanner consumes quote characters, so a
    // field containing one comes back without it.
    let records = vec![record(
        "2024-03-01",
        "Asha",
        "9771234567",
        EyeMeasurement::default(),
        EyeMeasurement::default(),
        "0",
        "0",
        "frame size 5\" approx",
    )];

    let decoded = decode(&encode(&records));
    assert_eq!(decoded[0].remarks, "frame size 5 approx");
}

prop_compose! {
    fn eye_strategy()(
        sphere in "[+-]?[0-9.]{0,5}",
        cylinder in "[+-]?[0-9.]{0,5}",
        axis in "[0-9]{0,3}",
        add in "[+-]?[0-9.]{0,5}",
    ) -> EyeMeasurement {
        EyeMeasurement { sphere, cylinder, axis, add }
    }
}

prop_compose! {
    fn record_strategy()(
        date in "20[0-9]{2}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9])",
        name in "[A-Za-z][A-Za-z ,.-]{0,24}",
        mobile in "[0-9]{10}",
        right_eye in eye_strategy(),
        left_eye in eye_strategy(),
        frame_price in "(0|[1-9][0-9]{0,4})",
        glass_price in "(0|[1-9][0-9]{0,4})",
        remarks in "[A-Za-z0-9][A-Za-z0-9 ,.+/-]{0,40}",
    ) -> PatientRecord {
        record(
            &date,
            &name,
            &mobile,
            right_eye,
            left_eye,
            &frame_price,
            &glass_price,
            &remarks,
        )
    }
}

proptest! {
    #[test]
    fn roundtrip_preserves_all_modeled_fields(
        records in proptest::collection::vec(record_strategy(), 1..20)
    ) {
        let decoded = decode(&encode(&records));

        prop_assert_eq!(decoded.len(), records.len());
        for (original, decoded) in records.iter().zip(&decoded) {
            assert_fields_preserved(original, decoded);
        }
    }
}
