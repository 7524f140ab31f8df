//! # Engine Error Taxonomy
//!
//! Every engine operation fails with an [`EngineError`]. Its variants are the
//! four failure classes the editor distinguishes:
//!
//! | Variant | Cause | Recovery |
//! |---|---|---|
//! | `InvalidPath` | mutation routed through a non-container | operation aborted |
//! | `SchemaInvalid` | document-level check failed | message shown, state kept |
//! | `InstanceInvalid` | field-level violations | violations overlaid on fields |
//! | `Parse` | malformed input document | document rejected, state kept |
//!
//! None of them leaves a session partially updated.

use adamant_core::PathError;
use thiserror::Error;

use crate::validate::ValidationViolations;

/// Structural problem while converting between the canonical and the
/// editable representation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// A `properties` value has the wrong container type for the
    /// representation being converted.
    #[error("'properties' at '{path}' must be {expected}, found {found}")]
    PropertiesShape {
        /// Dotted location of the offending `properties` key.
        path: String,
        /// The container type the conversion expected.
        expected: &'static str,
        /// JSON type actually found.
        found: &'static str,
    },

    /// A property or `items` schema is not a JSON object.
    #[error("schema at '{path}' must be an object, found {found}")]
    NotASchema {
        /// Dotted location of the offending schema.
        path: String,
        /// JSON type actually found.
        found: &'static str,
    },

    /// An editable entry has no string `fieldKey`.
    #[error("entry {index} at '{path}' has no string fieldKey")]
    MissingFieldKey {
        /// Dotted location of the entry list.
        path: String,
        /// Position of the entry in its list.
        index: usize,
    },
}

/// A schema document could not be read.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The text is not JSON.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON root is not an object.
    #[error("schema document must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// The document is JSON but its `properties` tree cannot be converted.
    #[error("malformed schema structure: {0}")]
    Structure(#[from] ConvertError),
}

/// Error returned by engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A structural mutation passed through a value that cannot hold
    /// children.
    #[error(transparent)]
    InvalidPath(#[from] PathError),

    /// The schema document failed validation.
    #[error("schema is invalid: {reason}")]
    SchemaInvalid {
        /// Human-readable reason, suitable for display.
        reason: String,
    },

    /// The data instance failed validation against its schema.
    #[error("data instance is invalid:\n{violations}")]
    InstanceInvalid {
        /// Every violation found, in traversal order.
        violations: ValidationViolations,
    },

    /// The input document could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl EngineError {
    /// Shorthand for [`EngineError::SchemaInvalid`].
    pub fn schema_invalid(reason: impl Into<String>) -> Self {
        Self::SchemaInvalid {
            reason: reason.into(),
        }
    }
}

impl From<ConvertError> for EngineError {
    fn from(err: ConvertError) -> Self {
        Self::Parse(ParseError::Structure(err))
    }
}

/// Error while loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file '{path}': {source}")]
    Io {
        /// Path of the configuration file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration text is not valid YAML for the config shape.
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
