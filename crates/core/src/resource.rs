//! Resource and diff records threaded through normalization, comparison and patching.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::normalize::{normalize, Decoded};
use crate::paths::{join_logical_path, sanitize_path_segment};
use crate::value::Value;

/// Payload either already canonical or still awaiting normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Normalized(Value),
    Raw(Decoded),
}

impl Default for Payload {
    fn default() -> Self { Payload::Normalized(Value::Null) }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self { Payload::Normalized(v) }
}

impl From<Decoded> for Payload {
    fn from(d: Decoded) -> Self { Payload::Raw(d) }
}

/// A declared or fetched resource. Metadata is opaque here and carried as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource {
    pub logical_path: String,
    pub collection_path: String,
    pub local_alias: String,
    pub remote_id: String,
    pub resolved_remote_path: String,
    pub metadata: Value,
    pub payload: Payload,
}

impl Resource {
    pub fn new(logical_path: impl Into<String>, payload: impl Into<Payload>) -> Self {
        Self { logical_path: logical_path.into(), payload: payload.into(), ..Default::default() }
    }

    /// Canonical payload; raw payloads are normalized on the fly.
    pub fn normalized_payload(&self) -> Result<Value> {
        match &self.payload {
            Payload::Normalized(v) => Ok(v.clone()),
            Payload::Raw(d) => normalize(d.clone()),
        }
    }

    /// Scalar attribute at a dotted path rendered as text, e.g. to derive an id or alias.
    pub fn lookup_attribute(&self, dotted: &str) -> Result<Option<String>> {
        let payload = self.normalized_payload()?;
        let mut cur = &payload;
        let mut any = false;
        for seg in dotted.split('.').map(str::trim).filter(|s| !s.is_empty()) {
            any = true;
            cur = match cur.as_object().and_then(|m| m.get(seg)) {
                Some(v) => v,
                None => return Ok(None),
            };
        }
        if !any { return Ok(None); }
        Ok(cur.render_scalar())
    }

    /// `collection_path` joined with the alias, falling back to the remote id.
    pub fn derive_logical_path(&self) -> Result<String> {
        let segment = if self.local_alias.trim().is_empty() { &self.remote_id } else { &self.local_alias };
        let collection = if self.collection_path.trim().is_empty() { "/" } else { &self.collection_path };
        join_logical_path(collection, &sanitize_path_segment(segment))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffOperation { Add, Remove, Replace }

impl DiffOperation {
    pub fn as_str(&self) -> &'static str {
        match self { DiffOperation::Add => "add", DiffOperation::Remove => "remove", DiffOperation::Replace => "replace" }
    }
}

impl fmt::Display for DiffOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.as_str()) }
}

/// One detected difference. `local` is absent for `add`, `remote` for `remove`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffEntry {
    pub resource_path: String,
    pub path: String,
    pub operation: DiffOperation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<Value>,
}
