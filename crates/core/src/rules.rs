//! Rule-set records: what to compare, and how to shape outgoing payloads.
//!
//! These are read concurrently by many operations while per-operation overrides are
//! built elsewhere, so every clone/merge here produces fresh backing storage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Comparison rules applied identically to local and remote payloads before diffing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompareMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_attributes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_attributes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_attributes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub jq_expression: String,
}

/// Payload shaping for requests sent to a remote endpoint. No ignore list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationPayloadConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_attributes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_attributes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub jq_expression: String,
}

impl CompareMetadata {
    pub fn ignore(&self) -> &[String] { self.ignore_attributes.as_deref().unwrap_or(&[]) }
    pub fn suppress(&self) -> &[String] { self.suppress_attributes.as_deref().unwrap_or(&[]) }
    pub fn filter(&self) -> &[String] { self.filter_attributes.as_deref().unwrap_or(&[]) }

    /// Projection expression, if one is set (blank counts as unset).
    pub fn jq(&self) -> Option<&str> { non_blank(&self.jq_expression) }

    /// Layer `overrides` on top of `base`. A list present in the override replaces the
    /// base list wholesale; the expression is replaced only by a non-blank one.
    pub fn merge(base: Option<&CompareMetadata>, overrides: Option<&CompareMetadata>) -> Option<CompareMetadata> {
        let overrides = match overrides {
            Some(o) => o,
            None => return base.cloned(),
        };
        let mut out = match base {
            Some(b) => b.clone(),
            None => return Some(overrides.clone()),
        };
        if overrides.ignore_attributes.is_some() { out.ignore_attributes = overrides.ignore_attributes.clone(); }
        if overrides.suppress_attributes.is_some() { out.suppress_attributes = overrides.suppress_attributes.clone(); }
        if overrides.filter_attributes.is_some() { out.filter_attributes = overrides.filter_attributes.clone(); }
        out.jq_expression = choose_string(&out.jq_expression, &overrides.jq_expression);
        Some(out)
    }
}

impl OperationPayloadConfig {
    pub fn suppress(&self) -> &[String] { self.suppress_attributes.as_deref().unwrap_or(&[]) }
    pub fn filter(&self) -> &[String] { self.filter_attributes.as_deref().unwrap_or(&[]) }
    pub fn jq(&self) -> Option<&str> { non_blank(&self.jq_expression) }

    pub fn merge(
        base: Option<&OperationPayloadConfig>,
        overrides: Option<&OperationPayloadConfig>,
    ) -> Option<OperationPayloadConfig> {
        let overrides = match overrides {
            Some(o) => o,
            None => return clone_operation_payload_config(base),
        };
        let mut out = match clone_operation_payload_config(base) {
            Some(b) => b,
            None => return Some(overrides.clone()),
        };
        if overrides.suppress_attributes.is_some() { out.suppress_attributes = overrides.suppress_attributes.clone(); }
        if overrides.filter_attributes.is_some() { out.filter_attributes = overrides.filter_attributes.clone(); }
        out.jq_expression = choose_string(&out.jq_expression, &overrides.jq_expression);
        Some(out)
    }
}

impl From<&OperationPayloadConfig> for CompareMetadata {
    fn from(p: &OperationPayloadConfig) -> Self {
        CompareMetadata {
            ignore_attributes: None,
            suppress_attributes: p.suppress_attributes.clone(),
            filter_attributes: p.filter_attributes.clone(),
            jq_expression: p.jq_expression.clone(),
        }
    }
}

/// Deep copy with fresh list storage; `None` stays `None`.
pub fn clone_operation_payload_config(src: Option<&OperationPayloadConfig>) -> Option<OperationPayloadConfig> {
    src.map(|s| OperationPayloadConfig {
        suppress_attributes: Some(s.suppress().to_vec()),
        filter_attributes: Some(s.filter().to_vec()),
        jq_expression: s.jq_expression.clone(),
    })
}

/// Shallow-keyed copy of a mapping; a missing source yields an empty map, never `None`.
pub fn clone_map<V: Clone>(src: Option<&BTreeMap<String, V>>) -> BTreeMap<String, V> {
    src.cloned().unwrap_or_default()
}

fn non_blank(s: &str) -> Option<&str> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t) }
}

fn choose_string(current: &str, candidate: &str) -> String {
    if candidate.trim().is_empty() { current.to_string() } else { candidate.to_string() }
}
