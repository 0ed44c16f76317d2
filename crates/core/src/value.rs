//! Canonical value model: the seven shapes every comparison and patch works on.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Object storage. `BTreeMap` keeps keys unique and iterates them lexicographically.
pub type Map = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    String(String),
    Int(i64),
    /// Always finite; the normalizer rejects NaN and infinities.
    Float(f64),
    Array(Vec<Value>),
    Object(Map),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind { Null, Bool, String, Int, Float, Array, Object }

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::String(_) => ValueKind::String,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn is_object(&self) -> bool { matches!(self, Value::Object(_)) }
    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    pub fn as_object(&self) -> Option<&Map> {
        match self { Value::Object(m) => Some(m), _ => None }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Map> {
        match self { Value::Object(m) => Some(m), _ => None }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self { Value::Array(a) => Some(a), _ => None }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self { Value::String(s) => Some(s), _ => None }
    }

    /// Resolve an escaped pointer (`/a/b~1c`) to a sub-value. `/` and `""` address the root.
    /// Array indices are accepted for lookup even though patches never emit them.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        if pointer.is_empty() || pointer == "/" { return Some(self); }
        let rest = pointer.strip_prefix('/')?;
        let mut cur = self;
        for raw in rest.split('/') {
            let token = raw.replace("~1", "/").replace("~0", "~");
            cur = match cur {
                Value::Object(m) => m.get(&token)?,
                Value::Array(a) => a.get(token.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(cur)
    }

    /// Render a scalar for use in paths and templates. Containers yield `None`.
    pub fn render_scalar(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::String(s) => serializer.serialize_str(s),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items { seq.serialize_element(item)?; }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map { out.serialize_entry(k, v)?; }
                out.end()
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        use serde_json::Value as Json;
        match v {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(b),
            Value::String(s) => Json::String(s),
            Value::Int(i) => Json::Number(i.into()),
            // Finite by construction, so from_f64 only fails on input that never reaches here
            Value::Float(f) => serde_json::Number::from_f64(f).map(Json::Number).unwrap_or(Json::Null),
            Value::Array(items) => Json::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => Json::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<bool> for Value { fn from(b: bool) -> Self { Value::Bool(b) } }
impl From<i64> for Value { fn from(i: i64) -> Self { Value::Int(i) } }
impl From<&str> for Value { fn from(s: &str) -> Self { Value::String(s.to_string()) } }
impl From<String> for Value { fn from(s: String) -> Self { Value::String(s) } }
impl From<Map> for Value { fn from(m: Map) -> Self { Value::Object(m) } }
impl From<Vec<Value>> for Value { fn from(a: Vec<Value>) -> Self { Value::Array(a) } }

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(pairs: &[(&str, Value)]) -> Value {
        Value::Object(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    #[test]
    fn display_is_compact_json_with_sorted_keys() {
        let v = obj(&[("b", Value::Int(2)), ("a", Value::Array(vec![Value::Null, Value::Float(1.5)]))]);
        assert_eq!(v.to_string(), r#"{"a":[null,1.5],"b":2}"#);
    }

    #[test]
    fn pointer_unescapes_tokens() {
        let v = obj(&[("a/b", obj(&[("x~y", Value::from("hit"))])), ("list", Value::Array(vec![Value::Int(7)]))]);
        assert_eq!(v.pointer("/a~1b/x~0y"), Some(&Value::from("hit")));
        assert_eq!(v.pointer("/list/0"), Some(&Value::Int(7)));
        assert_eq!(v.pointer("/"), Some(&v));
        assert_eq!(v.pointer("/missing"), None);
        assert_eq!(v.pointer("no-slash"), None);
    }

    #[test]
    fn into_json_keeps_number_kinds() {
        let j: serde_json::Value = obj(&[("i", Value::Int(3)), ("f", Value::Float(0.25))]).into();
        assert!(j["i"].is_i64());
        assert!(j["f"].is_f64());
    }
}
