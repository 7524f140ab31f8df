//! # Content Digests for Exported Files
//!
//! Exported schemas and data instances are named after the SHA-256 digest of
//! their compact JSON text, e.g. `formdata-<hex>.json`. Two exports of the
//! same content therefore land on the same file name.
//!
//! Object key order is part of the hashed text. Trees built with the
//! `preserve_order` feature hash their keys in insertion order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// A SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute the SHA-256 digest of raw bytes.
pub fn sha256_bytes(data: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest { bytes }
}

/// Compute the SHA-256 digest of a value's compact JSON text.
pub fn sha256_digest(value: &Value) -> ContentDigest {
    sha256_bytes(value.to_string().as_bytes())
}

/// The kind of document being exported, which selects the file-name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// A JSON Schema document.
    Schema,
    /// A data instance filled against a schema.
    FormData,
}

impl ExportKind {
    /// File-name prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Schema => "jsonschema",
            Self::FormData => "formdata",
        }
    }
}

/// Content-addressed export file name: `<prefix>-<sha256 hex>.json`.
pub fn export_file_name(kind: ExportKind, value: &Value) -> String {
    format!("{}-{}.json", kind.prefix(), sha256_digest(value).to_hex())
}
