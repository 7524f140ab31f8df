//! # Engine Configuration
//!
//! Tunables for the editor engine. Every field has a default, so an empty
//! YAML mapping (or no configuration file at all) yields
//! [`EngineConfig::default()`].
//!
//! ```yaml
//! default_draft: "http://json-schema.org/draft-04/schema#"
//! require_identifier: true
//! stamp_schema_id: false
//! array_error_message: "Some rows are invalid."
//! ```

use std::path::Path;

use adamant_core::Draft;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Message flagged on an array-of-objects field when one of its elements is
/// invalid.
pub const DEFAULT_ARRAY_ERROR_MESSAGE: &str =
    "One or more fields in this array have invalid inputs. Please fix them.";

/// Configuration for schema validation and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Draft used for the identifier keyword when a header save leaves the
    /// schema version blank.
    #[serde(default)]
    pub default_draft: Draft,

    /// Whether a schema without `id`/`$id` fails document validation.
    #[serde(default = "default_true")]
    pub require_identifier: bool,

    /// Whether exported data instances carry a `SchemaID` key.
    #[serde(default = "default_true")]
    pub stamp_schema_id: bool,

    /// Annotation message for array-of-objects fields with invalid elements.
    #[serde(default = "default_array_error_message")]
    pub array_error_message: String,
}

fn default_true() -> bool {
    true
}

fn default_array_error_message() -> String {
    DEFAULT_ARRAY_ERROR_MESSAGE.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_draft: Draft::default(),
            require_identifier: default_true(),
            stamp_schema_id: default_true(),
            array_error_message: default_array_error_message(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from YAML text. Blank text yields the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read and parse a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), draft = %config.default_draft, "loaded engine config");
        Ok(config)
    }
}
