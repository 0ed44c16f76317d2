//! Rekon core: canonical values, normalization, logical paths and rule-set records.
//!
//! Everything here is a pure function over its arguments; no I/O, no shared state.

#![forbid(unsafe_code)]

pub mod error;
pub mod headers;
pub mod normalize;
pub mod paths;
pub mod resource;
pub mod rules;
pub mod value;

pub use error::{Result, ValidationError};
pub use normalize::{normalize, Decoded};
pub use paths::{child_segment, join_logical_path, normalize_logical_path, split_logical_path_segments};
pub use resource::{DiffEntry, DiffOperation, Payload, Resource};
pub use rules::{clone_map, clone_operation_payload_config, CompareMetadata, OperationPayloadConfig};
pub use value::{Map, Value, ValueKind};

pub mod prelude {
    pub use super::{
        normalize, CompareMetadata, Decoded, DiffEntry, DiffOperation, OperationPayloadConfig, Resource, Result,
        ValidationError, Value,
    };
}
