//! # Error Types — Structural Failures
//!
//! Leaf error types for the structural primitives in this crate. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Path errors are programming errors at the call site: a mutation was
//!   routed through a value that cannot hold children. They carry the path
//!   prefix that failed and the kind of value found there.
//! - Identifier errors carry the rejected candidate so the message can be
//!   shown to the user verbatim.

use thiserror::Error;

/// Error while parsing or following a dotted field path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path segment was empty (leading, trailing, or doubled `.`).
    #[error("empty segment at position {position} in path '{path}'")]
    EmptySegment {
        /// The full path text as given.
        path: String,
        /// Zero-based index of the empty segment.
        position: usize,
    },

    /// A mutation tried to pass through a value that is not a container.
    #[error("invalid path '{path}': cannot descend into {found}")]
    InvalidPath {
        /// The path prefix that resolved to the offending value.
        path: String,
        /// JSON type name of the value found at `path`.
        found: &'static str,
    },

    /// A write addressed an array position too far past its end.
    #[error("index {index} at '{path}' is out of range for an array of length {len}")]
    IndexOutOfRange {
        /// The path prefix holding the array.
        path: String,
        /// The requested position.
        index: usize,
        /// Length of the array found at `path`.
        len: usize,
    },
}

/// Error while validating a schema identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The identifier is empty or whitespace.
    #[error("Schema ID cannot be empty. Please provide a valid Schema ID.")]
    Empty,

    /// The identifier does not satisfy the table-name pattern.
    #[error(
        "Invalid table name '{0}'. It must start with a letter or underscore and contain only \
         letters, numbers, and underscores (up to 64 characters)."
    )]
    InvalidTableName(String),
}

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invalid_path_display_names_prefix_and_type() {
        let err = PathError::InvalidPath {
            path: "a.b".to_string(),
            found: "string",
        };
        let display = err.to_string();
        assert!(display.contains("a.b"));
        assert!(display.contains("string"));
    }

    #[test]
    fn index_out_of_range_display() {
        let err = PathError::IndexOutOfRange {
            path: "rows".to_string(),
            index: 5000,
            len: 2,
        };
        assert_eq!(
            err.to_string(),
            "index 5000 at 'rows' is out of range for an array of length 2"
        );
    }

    #[test]
    fn table_name_message_mentions_table_name() {
        let err = IdentifierError::InvalidTableName("1bad id".to_string());
        assert!(err.to_string().contains("table name"));
        assert!(err.to_string().contains("1bad id"));
    }

    #[test]
    fn json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(1.5)), "number");
        assert_eq!(json_type_name(&json!([])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
