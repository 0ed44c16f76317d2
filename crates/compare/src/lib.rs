//! Rekon compare: shape a payload by comparison rules before it is diffed.
//!
//! Rule order is fixed: ignore, suppress, filter, then JQ. Deny-lists run first, so a
//! path that is both denied and allowed ends up absent. Ignore/suppress/filter only
//! touch object payloads; the JQ projection sees whatever remains and may return any shape.

#![forbid(unsafe_code)]

pub mod attrs;
pub mod jq;

use metrics::counter;
use rekon_core::{CompareMetadata, OperationPayloadConfig, Resource, Result, Value};
use tracing::debug;

pub use attrs::{delete_attr_path, filter_attributes, get_attr_path, set_attr_path};
pub use jq::execute_jq;

/// Normalize the resource payload and shape it with `rules`.
pub fn apply_compare_rules(resource: &Resource, rules: Option<&CompareMetadata>) -> Result<Value> {
    let payload = resource.normalized_payload()?;
    let shaped = shape_value(payload, rules)?;
    debug!(path = %resource.logical_path, "compare rules applied");
    Ok(shaped)
}

/// Shape an already-normalized value.
pub fn shape_value(value: Value, rules: Option<&CompareMetadata>) -> Result<Value> {
    let Some(rules) = rules else { return Ok(value) };
    counter!("compare_rules_applied", 1u64);
    shape(value, rules.ignore(), rules.suppress(), rules.filter(), rules.jq())
}

/// Shape a payload about to be sent to a remote endpoint.
pub fn apply_payload_config(value: Value, config: Option<&OperationPayloadConfig>) -> Result<Value> {
    let Some(config) = config else { return Ok(value) };
    shape(value, &[], config.suppress(), config.filter(), config.jq())
}

fn shape(mut value: Value, ignore: &[String], suppress: &[String], filter: &[String], jq: Option<&str>) -> Result<Value> {
    if let Value::Object(obj) = &mut value {
        let ignored = attrs::remove_attributes(obj, ignore);
        let suppressed = attrs::remove_attributes(obj, suppress);
        if ignored + suppressed > 0 {
            debug!(ignored, suppressed, "attributes removed before comparison");
        }
        if !filter.is_empty() {
            *obj = attrs::filter_attributes(obj, filter);
        }
    }
    match jq {
        Some(expr) => jq::execute_jq(&value, expr),
        None => Ok(value),
    }
}
