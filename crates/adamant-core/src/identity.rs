//! # Schema Identifiers
//!
//! A schema's `id`/`$id` doubles as the name of the table its data instances
//! are loaded into downstream, so it has to satisfy a relational table-name
//! constraint: `^[A-Za-z_][A-Za-z0-9_]{0,63}$`.
//!
//! [`SchemaId`] validates that constraint at construction time.

use serde::{Deserialize, Serialize};

use crate::error::IdentifierError;

/// Maximum identifier length in characters.
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// A validated schema identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SchemaId(String);

impl SchemaId {
    /// Validate `value` as a schema identifier.
    ///
    /// Surrounding whitespace is not trimmed: `" a"` is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::Empty`] for empty or whitespace-only input
    /// and [`IdentifierError::InvalidTableName`] when the table-name pattern
    /// is not satisfied.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(IdentifierError::Empty);
        }
        if !is_table_name(&raw) {
            return Err(IdentifierError::InvalidTableName(raw));
        }
        Ok(Self(raw))
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for SchemaId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SchemaId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SchemaId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns true if `candidate` matches `^[A-Za-z_][A-Za-z0-9_]{0,63}$`.
pub fn is_table_name(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    candidate.len() <= MAX_IDENTIFIER_LEN
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
