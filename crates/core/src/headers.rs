//! HTTP header lists as declared in operation metadata, plus request defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

pub type HeaderMap = BTreeMap<String, Vec<String>>;

const JSON: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

/// `"Name: value"` lines. Accepts either plain lines or `{name, value}` records on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HeaderList(pub Vec<String>);

impl<'de> Deserialize<'de> for HeaderList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Lines(Vec<String>),
            Entries(Vec<HeaderEntry>),
            Null(()),
        }
        match Wire::deserialize(deserializer) {
            Ok(Wire::Lines(lines)) => Ok(HeaderList(lines)),
            Ok(Wire::Entries(entries)) => Ok(headers_from_entries(entries)),
            Ok(Wire::Null(())) => Ok(HeaderList::default()),
            Err(_) => Err(serde::de::Error::custom("invalid httpHeaders format")),
        }
    }
}

fn headers_from_entries(entries: Vec<HeaderEntry>) -> HeaderList {
    HeaderList(
        entries
            .into_iter()
            .filter_map(|e| {
                let (name, value) = (e.name.trim(), e.value.trim());
                if name.is_empty() || value.is_empty() { None } else { Some(format!("{}: {}", name, value)) }
            })
            .collect(),
    )
}

/// Split `"Name: value"`; both halves must be non-blank.
pub fn split_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() { return None; }
    Some((name, value))
}

/// MIME-style canonical form: `content-type` -> `Content-Type`. Keys with bytes outside
/// the token alphabet are returned unchanged.
pub fn canonical_header_key(key: &str) -> String {
    let valid = key.bytes().all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
    if !valid { return key.to_string(); }
    let mut upper = true;
    key.chars()
        .map(|c| {
            let out = if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() };
            upper = c == '-';
            out
        })
        .collect()
}

pub fn header_map(headers: &HeaderList) -> HeaderMap {
    let mut out = HeaderMap::new();
    for line in &headers.0 {
        match split_header_line(line) {
            Some((name, value)) => out.entry(canonical_header_key(name)).or_default().push(value.to_string()),
            None => warn!(line = %line, "skipping malformed header line"),
        }
    }
    out
}

pub fn method_supports_body(method: &str) -> bool {
    matches!(method.trim().to_ascii_uppercase().as_str(), "POST" | "PUT" | "PATCH" | "DELETE")
}

/// Canonicalize keys, drop blanks, then default `Accept` (always) and `Content-Type`
/// (for methods that carry a body) to JSON.
pub fn apply_header_defaults(headers: &HeaderMap, method: &str) -> HeaderMap {
    let mut out = HeaderMap::new();
    for (key, values) in headers {
        let key = key.trim();
        if key.is_empty() { continue; }
        let slot = out.entry(canonical_header_key(key)).or_default();
        slot.extend(values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string));
    }
    out.retain(|_, v| !v.is_empty());
    out.entry("Accept".to_string()).or_insert_with(|| vec![JSON.to_string()]);
    if method_supports_body(method) {
        out.entry("Content-Type".to_string()).or_insert_with(|| vec![JSON.to_string()]);
    }
    out
}

/// Flatten back to lines, sorted by key.
pub fn header_list_from_map(headers: &HeaderMap) -> HeaderList {
    let mut out = Vec::new();
    for (key, values) in headers {
        if key.trim().is_empty() { continue; }
        for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
            out.push(format!("{}: {}", key, value));
        }
    }
    HeaderList(out)
}

pub fn ensure_header_defaults(headers: &HeaderList, method: &str) -> HeaderList {
    header_list_from_map(&apply_header_defaults(&header_map(headers), method))
}
