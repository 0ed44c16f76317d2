//! Dotted attribute paths (`meta.updatedAt`). They address object keys only: arrays and
//! scalars along the way mean "not found", never an error.

use rekon_core::{Map, Value};

/// Split on `.`, trimming segments and skipping empty ones.
pub fn split_attr_path(path: &str) -> Vec<&str> {
    path.split('.').map(str::trim).filter(|s| !s.is_empty()).collect()
}

pub fn get_attr_path<'a>(obj: &'a Map, path: &str) -> Option<&'a Value> {
    let segments = split_attr_path(path);
    let (last, parents) = segments.split_last()?;
    let mut cur = obj;
    for seg in parents {
        cur = cur.get(*seg)?.as_object()?;
    }
    cur.get(*last)
}

/// Set a value, creating (or overwriting non-object) intermediate objects.
pub fn set_attr_path(obj: &mut Map, path: &str, value: Value) {
    let segments = split_attr_path(path);
    let Some((last, parents)) = segments.split_last() else { return };
    let mut cur = obj;
    for seg in parents {
        let slot = cur.entry(seg.to_string()).or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        cur = match slot.as_object_mut() {
            Some(m) => m,
            None => return,
        };
    }
    cur.insert(last.to_string(), value);
}

/// Remove the addressed key from its parent object. Returns whether something was removed.
pub fn delete_attr_path(obj: &mut Map, path: &str) -> bool {
    let segments = split_attr_path(path);
    let Some((last, parents)) = segments.split_last() else { return false };
    let mut cur = obj;
    for seg in parents {
        cur = match cur.get_mut(*seg).and_then(Value::as_object_mut) {
            Some(m) => m,
            None => return false,
        };
    }
    cur.remove(*last).is_some()
}

/// Keep only the listed paths (plus the ancestors holding them).
pub fn filter_attributes(src: &Map, paths: &[String]) -> Map {
    let mut out = Map::new();
    for path in paths {
        if let Some(v) = get_attr_path(src, path) {
            set_attr_path(&mut out, path, v.clone());
        }
    }
    out
}

pub fn remove_attributes(obj: &mut Map, paths: &[String]) -> usize {
    paths.iter().filter(|p| delete_attr_path(obj, p)).count()
}
