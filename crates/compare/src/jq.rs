//! JQ projection over canonical values, backed by jaq.

use jaq_interpret::{Ctx, FilterT, ParseCtx, RcIter, Val};
use metrics::counter;
use rekon_core::{normalize, Decoded, Result, ValidationError, Value};
use tracing::debug;

/// Evaluate `expression` against `input`.
///
/// No output yields `Null`, exactly one output is returned as-is, several outputs are
/// collected into an array. The result is normalized like any other payload.
pub fn execute_jq(input: &Value, expression: &str) -> Result<Value> {
    counter!("compare_jq_eval", 1u64);

    let mut defs = ParseCtx::new(Vec::new());
    defs.insert_natives(jaq_core::core());
    defs.insert_defs(jaq_std::std());

    let (parsed, errs) = jaq_parse::parse(expression, jaq_parse::main());
    if !errs.is_empty() {
        return Err(ValidationError::new(format!("invalid jq expression {:?}: {:?}", expression, errs)));
    }
    let parsed = parsed.ok_or_else(|| ValidationError::new(format!("invalid jq expression {:?}", expression)))?;
    let filter = defs.compile(parsed);
    if !defs.errs.is_empty() {
        return Err(ValidationError::new(format!(
            "invalid jq expression {:?}: {} undefined symbol(s)",
            expression,
            defs.errs.len()
        )));
    }

    let inputs = RcIter::new(core::iter::empty());
    let json: serde_json::Value = input.clone().into();
    let mut results = Vec::new();
    for out in filter.run((Ctx::new([], &inputs), Val::from(json))) {
        match out {
            Ok(v) => results.push(decoded_from_val(&v)),
            Err(e) => return Err(ValidationError::new(format!("jq evaluation failed: {}", e))),
        }
    }
    debug!(expression, outputs = results.len(), "jq evaluated");

    let projected = match results.len() {
        0 => Decoded::Null,
        1 => results.remove(0),
        _ => Decoded::Seq(results),
    };
    normalize(projected)
}

/// Floats stay floats so non-finite outputs fail normalization instead of degrading to null.
fn decoded_from_val(v: &Val) -> Decoded {
    match v {
        Val::Null => Decoded::Null,
        Val::Bool(b) => Decoded::Bool(*b),
        Val::Int(i) => Decoded::Int(*i as i64),
        Val::Float(f) => Decoded::Float64(*f),
        Val::Num(n) => Decoded::Number(n.to_string()),
        Val::Str(s) => Decoded::String(s.to_string()),
        Val::Arr(items) => Decoded::Seq(items.iter().map(decoded_from_val).collect()),
        Val::Obj(map) => Decoded::Map(
            map.iter().map(|(k, item)| (Decoded::String(k.to_string()), decoded_from_val(item))).collect(),
        ),
    }
}
