use proptest::prelude::*;
use rekon_core::{normalize, Decoded, Value};

fn arb_key() -> impl Strategy<Value = String> {
    "[a-z~/]{0,6}"
}

fn arb_decoded() -> impl Strategy<Value = Decoded> {
    let leaf = prop_oneof![
        Just(Decoded::Null),
        any::<bool>().prop_map(Decoded::Bool),
        "[a-zA-Z0-9 ]{0,8}".prop_map(Decoded::String),
        any::<i64>().prop_map(Decoded::Int),
        (0u64..=i64::MAX as u64).prop_map(Decoded::Uint),
        any::<i16>().prop_map(|i| Decoded::Number(i.to_string())),
        (-1.0e9f64..1.0e9f64).prop_map(Decoded::Float64),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Decoded::Seq),
            prop::collection::vec((arb_key(), inner), 0..6)
                .prop_map(|kv| Decoded::Map(kv.into_iter().map(|(k, v)| (Decoded::String(k), v)).collect())),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_normalize_is_idempotent(input in arb_decoded()) {
        let once = normalize(input).unwrap();
        let twice = normalize(once.clone()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_unsigned_above_i64_max_is_rejected(u in (i64::MAX as u64 + 1)..=u64::MAX) {
        prop_assert!(normalize(u).is_err());
    }
}

#[test]
fn json_round_trip_through_canonical_form_is_stable() {
    let doc = r#"{"b":[1,2.5,"x",null,true],"a":{"z":{},"y":[]}}"#;
    let parsed: serde_json::Value = serde_json::from_str(doc).unwrap();
    let canonical = normalize(parsed).unwrap();
    assert_eq!(canonical.to_string(), r#"{"a":{"y":[],"z":{}},"b":[1,2.5,"x",null,true]}"#);
    let reparsed: serde_json::Value = serde_json::from_str(&canonical.to_string()).unwrap();
    assert_eq!(normalize(reparsed).unwrap(), canonical);
}

#[test]
fn oversized_json_integer_is_a_range_error() {
    // serde_json keeps the original digits, so this never degrades to a float
    let parsed: serde_json::Value = serde_json::from_str(r#"{"n": 18446744073709551616}"#).unwrap();
    let err = normalize(parsed).unwrap_err();
    assert!(err.message().contains("out of range"), "err={}", err);
}

#[test]
fn yaml_and_json_agree() {
    let y: serde_yaml::Value = serde_yaml::from_str("id: 1\nratio: 0.5\ntags: [a, b]\n").unwrap();
    let j: serde_json::Value = serde_json::from_str(r#"{"tags":["a","b"],"ratio":0.5,"id":1}"#).unwrap();
    assert_eq!(Value::try_from(y).unwrap(), Value::try_from(j).unwrap());
}
