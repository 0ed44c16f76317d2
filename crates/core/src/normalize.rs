//! Value normalizer: decoded input of any supported shape -> canonical [`Value`].
//!
//! Input arrives as a [`Decoded`] tree. Decoders (serde_json, serde_yaml, or plain Rust
//! values through `From`) map into it once at the boundary; [`normalize`] then walks it
//! in a single pass and stops at the first problem.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, ValidationError};
use crate::value::{Map, Value};

/// Pre-normalization value as handed over by a decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Null,
    Bool(bool),
    String(String),
    Int(i64),
    Uint(u64),
    Float32(f32),
    Float64(f64),
    /// Number that kept its original text (number-preserving JSON/YAML decoding).
    Number(String),
    Seq(Vec<Decoded>),
    /// Keyed container; keys are checked to be strings during normalization.
    Map(Vec<(Decoded, Decoded)>),
    /// Anything outside the supported shapes, carrying its type name.
    Opaque(String),
}

impl Decoded {
    pub fn type_name(&self) -> &str {
        match self {
            Decoded::Null => "null",
            Decoded::Bool(_) => "bool",
            Decoded::String(_) => "string",
            Decoded::Int(_) => "int64",
            Decoded::Uint(_) => "uint64",
            Decoded::Float32(_) => "float32",
            Decoded::Float64(_) => "float64",
            Decoded::Number(_) => "number",
            Decoded::Seq(_) => "sequence",
            Decoded::Map(_) => "mapping",
            Decoded::Opaque(name) => name,
        }
    }

    pub fn opaque(type_name: impl Into<String>) -> Self { Decoded::Opaque(type_name.into()) }

    /// Count every node of the tree, stopping once `max` is reached.
    pub fn node_count(&self, max: usize) -> usize {
        fn walk(v: &Decoded, cur: &mut usize, max: usize) {
            if *cur >= max { return; }
            *cur += 1;
            match v {
                Decoded::Seq(items) => {
                    for item in items {
                        if *cur >= max { break; }
                        walk(item, cur, max);
                    }
                }
                Decoded::Map(entries) => {
                    for (_k, item) in entries {
                        if *cur >= max { break; }
                        walk(item, cur, max);
                    }
                }
                _ => {}
            }
        }
        let mut count = 0usize;
        walk(self, &mut count, max);
        count
    }
}

/// Normalize a decoded value into the canonical model.
pub fn normalize(value: impl Into<Decoded>) -> Result<Value> {
    normalize_decoded(value.into())
}

fn normalize_decoded(value: Decoded) -> Result<Value> {
    match value {
        Decoded::Null => Ok(Value::Null),
        Decoded::Bool(b) => Ok(Value::Bool(b)),
        Decoded::String(s) => Ok(Value::String(s)),
        Decoded::Int(i) => Ok(Value::Int(i)),
        Decoded::Uint(u) => normalize_uint(u).map(Value::Int),
        Decoded::Float32(f) => normalize_float(f64::from(f)).map(Value::Float),
        Decoded::Float64(f) => normalize_float(f).map(Value::Float),
        Decoded::Number(text) => normalize_number(&text),
        Decoded::Seq(items) => items.into_iter().map(normalize_decoded).collect::<Result<Vec<_>>>().map(Value::Array),
        Decoded::Map(entries) => normalize_map(entries),
        Decoded::Opaque(name) => Err(ValidationError::new(format!("unsupported payload type {}", name))),
    }
}

fn normalize_float(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(ValidationError::new("payload contains non-finite float"));
    }
    Ok(value)
}

fn normalize_uint(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| ValidationError::new("payload contains integer out of range"))
}

/// Resolve numeric text: exact i64, then integer literal (must still fit i64), then finite float.
fn normalize_number(text: &str) -> Result<Value> {
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    if is_integer_literal(text) {
        // A well-formed integer that i64 rejected can only be out of range.
        return Err(ValidationError::new("payload contains integer out of range"));
    }
    match text.parse::<f64>() {
        Ok(f) => normalize_float(f).map(Value::Float),
        Err(e) => Err(ValidationError::with_source("payload contains invalid number", e)),
    }
}

fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Keys are checked first, then values normalized in key order so the reported error is stable.
fn normalize_map(entries: Vec<(Decoded, Decoded)>) -> Result<Value> {
    let mut keyed = Vec::with_capacity(entries.len());
    for (key, item) in entries {
        match key {
            Decoded::String(s) => keyed.push((s, item)),
            other => {
                return Err(ValidationError::new(format!(
                    "payload map keys must be strings, found {}",
                    other.type_name()
                )))
            }
        }
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    let mut out = Map::new();
    for (key, item) in keyed {
        out.insert(key, normalize_decoded(item)?);
    }
    Ok(Value::Object(out))
}

// ---- adapters into Decoded ----

impl From<Value> for Decoded {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Decoded::Null,
            Value::Bool(b) => Decoded::Bool(b),
            Value::String(s) => Decoded::String(s),
            Value::Int(i) => Decoded::Int(i),
            Value::Float(f) => Decoded::Float64(f),
            Value::Array(items) => Decoded::Seq(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => Decoded::Map(map.into_iter().map(|(k, v)| (Decoded::String(k), v.into())).collect()),
        }
    }
}

impl From<serde_json::Value> for Decoded {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match v {
            Json::Null => Decoded::Null,
            Json::Bool(b) => Decoded::Bool(b),
            Json::String(s) => Decoded::String(s),
            // Textual form; exact under `arbitrary_precision`
            Json::Number(n) => Decoded::Number(n.to_string()),
            Json::Array(items) => Decoded::Seq(items.into_iter().map(Into::into).collect()),
            Json::Object(map) => Decoded::Map(map.into_iter().map(|(k, v)| (Decoded::String(k), v.into())).collect()),
        }
    }
}

impl From<serde_yaml::Value> for Decoded {
    fn from(v: serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;
        match v {
            Yaml::Null => Decoded::Null,
            Yaml::Bool(b) => Decoded::Bool(b),
            Yaml::String(s) => Decoded::String(s),
            Yaml::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Decoded::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Decoded::Uint(u)
                } else {
                    Decoded::Float64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Yaml::Sequence(items) => Decoded::Seq(items.into_iter().map(Into::into).collect()),
            Yaml::Mapping(map) => Decoded::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
            Yaml::Tagged(_) => Decoded::opaque("tagged"),
        }
    }
}

macro_rules! decoded_from_signed {
    ($($t:ty),*) => { $(impl From<$t> for Decoded { fn from(v: $t) -> Self { Decoded::Int(v as i64) } })* };
}
macro_rules! decoded_from_unsigned {
    ($($t:ty),*) => { $(impl From<$t> for Decoded { fn from(v: $t) -> Self { Decoded::Uint(v as u64) } })* };
}
decoded_from_signed!(i8, i16, i32, i64, isize);
decoded_from_unsigned!(u8, u16, u32, u64, usize);

impl From<bool> for Decoded { fn from(v: bool) -> Self { Decoded::Bool(v) } }
impl From<f32> for Decoded { fn from(v: f32) -> Self { Decoded::Float32(v) } }
impl From<f64> for Decoded { fn from(v: f64) -> Self { Decoded::Float64(v) } }
impl From<String> for Decoded { fn from(v: String) -> Self { Decoded::String(v) } }
impl From<&str> for Decoded { fn from(v: &str) -> Self { Decoded::String(v.to_string()) } }

impl<T: Into<Decoded>> From<Option<T>> for Decoded {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Decoded::Null) }
}

impl<T: Into<Decoded>> From<Vec<T>> for Decoded {
    fn from(v: Vec<T>) -> Self { Decoded::Seq(v.into_iter().map(Into::into).collect()) }
}

impl<K: Into<Decoded>, V: Into<Decoded>> From<BTreeMap<K, V>> for Decoded {
    fn from(v: BTreeMap<K, V>) -> Self { Decoded::Map(v.into_iter().map(|(k, v)| (k.into(), v.into())).collect()) }
}

impl<K: Into<Decoded>, V: Into<Decoded>> From<HashMap<K, V>> for Decoded {
    fn from(v: HashMap<K, V>) -> Self { Decoded::Map(v.into_iter().map(|(k, v)| (k.into(), v.into())).collect()) }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = ValidationError;
    fn try_from(v: serde_json::Value) -> Result<Self> { normalize(v) }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = ValidationError;
    fn try_from(v: serde_yaml::Value) -> Result<Self> { normalize(v) }
}
