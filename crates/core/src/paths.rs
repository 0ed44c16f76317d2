//! Logical paths: absolute, slash-separated addresses of resources and collections.
//!
//! Canonical form: leading `/`, no empty or `.` segments, no trailing slash (except
//! the root `/`). `..` and the reserved metadata segment `_` are rejected outright.

use crate::error::{Result, ValidationError};

const RESERVED_SEGMENT: &str = "_";

/// Validate and canonicalize a logical path.
pub fn normalize_logical_path(value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("logical path must not be empty"));
    }
    let input = value.replace('\\', "/");
    if !input.starts_with('/') {
        return Err(ValidationError::new("logical path must be absolute"));
    }

    let mut kept: Vec<&str> = Vec::new();
    for segment in input.split('/') {
        match segment {
            ".." => return Err(ValidationError::new("logical path must not contain traversal segments")),
            RESERVED_SEGMENT => {
                return Err(ValidationError::new("logical path must not contain reserved metadata segment \"_\""))
            }
            "" | "." => continue,
            s => kept.push(s),
        }
    }
    Ok(format!("/{}", kept.join("/")))
}

/// Append `segment` (trimmed, may itself contain `/`) to `collection_path` and validate the result.
pub fn join_logical_path(collection_path: &str, segment: &str) -> Result<String> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(ValidationError::new("logical path segment must not be empty"));
    }
    let mut joined = format!("{}/{}", collection_path.trim_end_matches(['/', '\\']), segment);
    if !joined.starts_with('/') && !joined.starts_with('\\') {
        joined.insert(0, '/');
    }
    normalize_logical_path(&joined)
}

/// Ordered non-empty segments of a valid non-root path. Root and invalid paths yield nothing.
pub fn split_logical_path_segments(value: &str) -> Vec<String> {
    match normalize_logical_path(value) {
        Ok(p) if p != "/" => p[1..].split('/').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// The single segment by which `candidate_path` extends `parent_path`, if it is an
/// immediate child. Invalid inputs are never children.
pub fn child_segment(parent_path: &str, candidate_path: &str) -> Option<String> {
    let parent = normalize_logical_path(parent_path).ok()?;
    let candidate = normalize_logical_path(candidate_path).ok()?;

    let prefix = if parent == "/" { "/".to_string() } else { format!("{}/", parent) };
    let remaining = candidate.strip_prefix(&prefix)?;
    if remaining.is_empty() || remaining.contains('/') {
        return None;
    }
    Some(remaining.to_string())
}

/// Last segment of a path-like string, or `""` for the root.
pub fn last_segment(path: &str) -> &str {
    path.trim_matches('/').rsplit('/').next().unwrap_or("")
}

/// Make an attribute value safe to use as one path segment.
pub fn sanitize_path_segment(segment: &str) -> String {
    segment.trim().replace(['/', '\\'], "-")
}
