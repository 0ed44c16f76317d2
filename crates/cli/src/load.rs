//! Document loading for the CLI: size and node budgets, JSON/YAML decoding.

use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rekon_core::{normalize, CompareMetadata, Decoded, Value};

pub fn max_payload_bytes() -> usize {
    std::env::var("REKON_MAX_PAYLOAD_BYTES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1 << 20) // 1 MiB default
}

pub fn max_payload_nodes() -> usize {
    std::env::var("REKON_MAX_PAYLOAD_NODES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(100_000)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format { Json, Yaml }

impl Format {
    /// `.json` decodes as JSON; everything else (stdin included) as YAML, a JSON superset.
    pub fn for_path(path: &str) -> Self {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

fn read_source(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path))
}

/// Decode text into the pre-normalization tree, enforcing the byte and node budgets.
pub fn decode_document(text: &str, format: Format, max_bytes: usize, max_nodes: usize) -> Result<Decoded> {
    if text.len() > max_bytes {
        return Err(anyhow!("payload too large (>{} bytes)", max_bytes));
    }
    let decoded: Decoded = match format {
        Format::Json => serde_json::from_str::<serde_json::Value>(text).context("parsing JSON")?.into(),
        Format::Yaml => serde_yaml::from_str::<serde_yaml::Value>(text).context("parsing YAML")?.into(),
    };
    if decoded.node_count(max_nodes.saturating_add(1)) > max_nodes {
        return Err(anyhow!("payload too complex (>{} nodes)", max_nodes));
    }
    Ok(decoded)
}

pub fn load_decoded(path: &str) -> Result<Decoded> {
    let text = read_source(path)?;
    decode_document(&text, Format::for_path(path), max_payload_bytes(), max_payload_nodes())
        .with_context(|| format!("loading {}", path))
}

pub fn load_value(path: &str) -> Result<Value> {
    let decoded = load_decoded(path)?;
    normalize(decoded).with_context(|| format!("normalizing {}", path))
}

pub fn load_rules(path: &str) -> Result<CompareMetadata> {
    let text = read_source(path)?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing rules file {}", path))
}
