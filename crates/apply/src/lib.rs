//! Rekon apply: minimal patches between canonical values, plus drift reports.
//!
//! Objects are the only containers diffed structurally. Arrays and scalars are leaves:
//! when they differ the whole value is replaced. Keys are visited in lexicographic
//! order, so the same inputs always produce the same patch.

#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use metrics::counter;
use rekon_core::{CompareMetadata, DiffEntry, DiffOperation, Resource, Result, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One RFC 6902-shaped operation. `value` is set for `add` and `replace`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourcePatchOp {
    pub op: DiffOperation,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

pub type ResourcePatch = Vec<ResourcePatchOp>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary { pub adds: usize, pub updates: usize, pub removes: usize }

impl DiffSummary {
    pub fn total(&self) -> usize { self.adds + self.updates + self.removes }
}

/// Escape one pointer token. `~` first, then `/`; the reverse order would re-escape `~1`.
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn join_pointer(base: &str, key: &str) -> String {
    format!("{}/{}", base, escape_pointer_token(key))
}

/// The root renders as `/` rather than the empty pointer.
fn pointer_or_root(path: &str) -> String {
    if path.is_empty() { "/".to_string() } else { path.to_string() }
}

/// Walk `from` -> `to` and report each change with the values on both sides.
fn walk<'a, F>(from: &'a Value, to: &'a Value, path: &str, emit: &mut F)
where
    F: FnMut(DiffOperation, String, Option<&'a Value>, Option<&'a Value>),
{
    if from == to { return; }
    match (from, to) {
        (Value::Object(a), Value::Object(b)) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                let child = join_pointer(path, key);
                match (a.get(key), b.get(key)) {
                    (Some(x), Some(y)) => walk(x, y, &child, emit),
                    (Some(x), None) => emit(DiffOperation::Remove, child, Some(x), None),
                    (None, Some(y)) => emit(DiffOperation::Add, child, None, Some(y)),
                    (None, None) => {}
                }
            }
        }
        _ => emit(DiffOperation::Replace, pointer_or_root(path), Some(from), Some(to)),
    }
}

/// Patch turning `from` into `to`. Never fails and never mutates its inputs.
pub fn build_json_patch(from: &Value, to: &Value) -> ResourcePatch {
    let mut patch = ResourcePatch::new();
    walk(from, to, "", &mut |op, path, _from, to| {
        let value = match op {
            DiffOperation::Remove => None,
            DiffOperation::Add | DiffOperation::Replace => to.cloned(),
        };
        patch.push(ResourcePatchOp { op, path, value });
    });
    counter!("patch_builds", 1u64);
    counter!("patch_ops_emitted", patch.len() as u64);
    debug!(ops = patch.len(), "patch built");
    patch
}

/// Same traversal as [`build_json_patch`] with `local` as the source and `remote` as the target.
pub fn build_diff_entries(resource_path: &str, local: &Value, remote: &Value) -> Vec<DiffEntry> {
    let mut entries = Vec::new();
    walk(local, remote, "", &mut |operation, path, l, r| {
        entries.push(DiffEntry {
            resource_path: resource_path.to_string(),
            path,
            operation,
            local: l.cloned(),
            remote: r.cloned(),
        });
    });
    entries
}

pub fn diff_summary(patch: &[ResourcePatchOp]) -> DiffSummary {
    let mut s = DiffSummary::default();
    for op in patch {
        match op.op {
            DiffOperation::Add => s.adds += 1,
            DiffOperation::Replace => s.updates += 1,
            DiffOperation::Remove => s.removes += 1,
        }
    }
    s
}

/// Everything a reconciliation step needs to know about one resource pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDiff {
    pub resource_path: String,
    pub patch: ResourcePatch,
    pub entries: Vec<DiffEntry>,
    pub summary: DiffSummary,
}

impl ResourceDiff {
    pub fn has_drift(&self) -> bool { !self.patch.is_empty() }
}

/// Normalize both sides, shape them with the same rules, then diff local -> remote.
pub fn compare_resources(local: &Resource, remote: &Resource, rules: Option<&CompareMetadata>) -> Result<ResourceDiff> {
    let local_shaped = rekon_compare::apply_compare_rules(local, rules)?;
    let remote_shaped = rekon_compare::apply_compare_rules(remote, rules)?;
    let resource_path = if local.logical_path.is_empty() { &remote.logical_path } else { &local.logical_path };

    let patch = build_json_patch(&local_shaped, &remote_shaped);
    let entries = build_diff_entries(resource_path, &local_shaped, &remote_shaped);
    let summary = diff_summary(&patch);
    debug!(path = %resource_path, adds = summary.adds, updates = summary.updates, removes = summary.removes, "resources compared");
    Ok(ResourceDiff { resource_path: resource_path.clone(), patch, entries, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rekon_core::normalize;
    use serde_json::json;

    fn v(j: serde_json::Value) -> Value { normalize(j).unwrap() }

    fn ops(patch: &ResourcePatch) -> Vec<String> {
        patch.iter().map(|p| format!("{} {}", p.op, p.path)).collect()
    }

    #[test]
    fn object_diff_in_key_order() {
        let from = v(json!({"a": "same", "b": "old", "c": {"d": "remove"}}));
        let to = v(json!({"a": "same", "b": "new", "c": {"e": "add"}, "f": "added"}));
        let patch = build_json_patch(&from, &to);
        assert_eq!(ops(&patch), vec!["replace /b", "remove /c/d", "add /c/e", "add /f"]);
        assert_eq!(patch[0].value, Some(Value::from("new")));
        assert_eq!(patch[1].value, None);
        assert_eq!(patch[3].value, Some(Value::from("added")));
    }

    #[test]
    fn arrays_are_replaced_whole() {
        let patch = build_json_patch(&v(json!(["a", "b"])), &v(json!(["a", "c"])));
        assert_eq!(patch.len(), 1);
        assert_eq!(ops(&patch), vec!["replace /"]);
        assert_eq!(patch[0].value, Some(v(json!(["a", "c"]))));

        let nested = build_json_patch(&v(json!({"l": [1, 2]})), &v(json!({"l": [1]})));
        assert_eq!(ops(&nested), vec!["replace /l"]);
    }

    #[test]
    fn keys_are_escaped() {
        let from = v(json!({"a/b": "old", "a~b": "same", "~/": 1}));
        let to = v(json!({"a/b": "new", "a~b": "same", "~/": 2}));
        assert_eq!(ops(&build_json_patch(&from, &to)), vec!["replace /a~1b", "replace /~0~1"]);
        assert_eq!(escape_pointer_token("~1"), "~01");
    }

    #[test]
    fn type_changes_replace() {
        assert_eq!(ops(&build_json_patch(&v(json!({"x": {"y": 1}})), &v(json!({"x": 1})))), vec!["replace /x"]);
        assert_eq!(ops(&build_json_patch(&v(json!({"x": 1})), &v(json!({"x": 1.0})))), vec!["replace /x"]);
        assert_eq!(ops(&build_json_patch(&Value::Null, &v(json!({})))), vec!["replace /"]);
    }

    #[test]
    fn equal_inputs_yield_nothing() {
        let doc = v(json!({"a": [1, {"b": null}]}));
        assert!(build_json_patch(&doc, &doc.clone()).is_empty());
    }

    #[test]
    fn diff_entries_carry_both_sides() {
        let local = v(json!({"keep": 1, "gone": true, "chg": "l"}));
        let remote = v(json!({"keep": 1, "new": "r", "chg": "r"}));
        let entries = build_diff_entries("/customers/acme", &local, &remote);
        let seen: Vec<_> = entries.iter().map(|e| (e.operation, e.path.as_str())).collect();
        assert_eq!(seen, vec![
            (DiffOperation::Replace, "/chg"),
            (DiffOperation::Remove, "/gone"),
            (DiffOperation::Add, "/new"),
        ]);
        assert_eq!(entries[0].local, Some(Value::from("l")));
        assert_eq!(entries[0].remote, Some(Value::from("r")));
        assert_eq!(entries[1].remote, None);
        assert_eq!(entries[2].local, None);
        assert!(entries.iter().all(|e| e.resource_path == "/customers/acme"));
    }

    #[test]
    fn summary_counts_by_kind() {
        let from = v(json!({"a": 1, "b": {"x": 1}, "c": [1, 2, 3]}));
        let to = v(json!({"a": 2, "b": {"x": 1, "y": 2}, "c": [1, 9], "d": true}));
        let s = diff_summary(&build_json_patch(&from, &to));
        assert_eq!(s, DiffSummary { adds: 2, updates: 2, removes: 0 });
        assert_eq!(s.total(), 4);
    }

    #[test]
    fn patch_serializes_like_rfc6902() {
        let patch = build_json_patch(&v(json!({"a": 1, "b": 2})), &v(json!({"a": 3})));
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"[{"op":"replace","path":"/a","value":3},{"op":"remove","path":"/b"}]"#
        );
    }
}
