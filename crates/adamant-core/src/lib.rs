//! # adamant-core — Structural Primitives for the Schema Editor Engine
//!
//! Leaf crate of the workspace. It knows nothing about form data or
//! validation; it only provides the tree operations the higher layers are
//! built from.
//!
//! ## Contents
//!
//! - [`path`]: dotted [`FieldPath`]s with tagged segments, and the pure
//!   [`get`](path::get) / [`set`](path::set) / [`delete`](path::delete)
//!   operations over `serde_json::Value` trees.
//! - [`keyword`]: the supported JSON Schema [`Draft`]s and the order-preserving
//!   keyword rename used to keep `id`/`$id` in step with the declared draft.
//! - [`identity`]: the [`SchemaId`] newtype, validated against the
//!   table-name pattern.
//! - [`digest`]: SHA-256 digests and content-addressed export file names.
//! - [`error`]: leaf error types.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `adamant-*` crates.
//! - Every tree operation takes `&Value` and returns a new value. Nothing
//!   here mutates caller-owned trees.
//! - No `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod identity;
pub mod keyword;
pub mod path;

pub use digest::{export_file_name, sha256_digest, ContentDigest, ExportKind};
pub use error::{json_type_name, IdentifierError, PathError};
pub use identity::{is_table_name, SchemaId};
pub use keyword::{normalize_identifiers, rename_keyword, Draft, DRAFT_04_URI, DRAFT_07_URI};
pub use path::{FieldPath, PathSegment};
