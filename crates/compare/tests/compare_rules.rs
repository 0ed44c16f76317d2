use rekon_compare::apply_compare_rules;
use rekon_core::{CompareMetadata, Decoded, Resource, Value};
use serde_json::json;

fn resource(payload: serde_json::Value) -> Resource {
    Resource::new("/customers/acme", Decoded::from(payload))
}

#[test]
fn ignore_suppress_and_filter_shape_the_payload() {
    let res = resource(json!({
        "id": "1",
        "name": "foo",
        "status": "active",
        "meta": {"updatedAt": "2024-01-01", "keep": "yes"}
    }));
    let rules: CompareMetadata = serde_yaml::from_str(
        "ignoreAttributes: [status]\nsuppressAttributes: [meta.updatedAt]\nfilterAttributes: [id, name, meta.keep]\n",
    )
    .unwrap();

    let got = apply_compare_rules(&res, Some(&rules)).unwrap();
    let obj = got.as_object().expect("object payload");
    assert!(!obj.contains_key("status"));
    let meta = obj["meta"].as_object().unwrap();
    assert_eq!(meta.get("keep"), Some(&Value::from("yes")));
    assert!(!meta.contains_key("updatedAt"));
    assert_eq!(got.to_string(), r#"{"id":"1","meta":{"keep":"yes"},"name":"foo"}"#);
}

#[test]
fn jq_projection_runs_last() {
    let res = resource(json!({"id": "1", "name": "foo"}));
    let rules = CompareMetadata { jq_expression: ".id".into(), ..Default::default() };
    assert_eq!(apply_compare_rules(&res, Some(&rules)).unwrap(), Value::from("1"));

    // filter already dropped `name`, so the projection sees null
    let rules = CompareMetadata {
        filter_attributes: Some(vec!["id".into()]),
        jq_expression: ".name".into(),
        ..Default::default()
    };
    assert_eq!(apply_compare_rules(&res, Some(&rules)).unwrap(), Value::Null);
}

#[test]
fn unreachable_paths_are_silently_ignored() {
    let res = resource(json!({"items": [{"id": 1}], "a": "scalar"}));
    let rules = CompareMetadata {
        ignore_attributes: Some(vec!["items.0.id".into(), "a.b".into(), "missing.key".into(), " ".into()]),
        ..Default::default()
    };
    assert_eq!(apply_compare_rules(&res, Some(&rules)).unwrap().to_string(), r#"{"a":"scalar","items":[{"id":1}]}"#);
}

#[test]
fn both_sides_shaped_identically() {
    let rules = CompareMetadata { ignore_attributes: Some(vec!["meta.etag".into()]), ..Default::default() };
    let local = resource(json!({"name": "x", "meta": {"etag": "a"}}));
    let remote = resource(json!({"meta": {"etag": "b"}, "name": "x"}));
    assert_eq!(
        apply_compare_rules(&local, Some(&rules)).unwrap(),
        apply_compare_rules(&remote, Some(&rules)).unwrap()
    );
}

#[test]
fn failures_surface_as_validation_errors() {
    let bad_payload = Resource::new("/x", Decoded::Map(vec![(Decoded::Int(1), Decoded::Null)]));
    assert!(apply_compare_rules(&bad_payload, None).is_err());

    let rules = CompareMetadata { jq_expression: "][".into(), ..Default::default() };
    assert!(apply_compare_rules(&resource(json!({})), Some(&rules)).is_err());
}
