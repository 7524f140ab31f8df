//! # adamant-schema — Schema/Form Dual-Representation Engine
//!
//! Keeps a JSON Schema document and the form data filled against it in
//! step while both are being edited.
//!
//! ## Representations (`convert`)
//!
//! A schema's `properties` is a map from field name to schema. The editor
//! works on an ordered entry list in which each field carries its name
//! under `fieldKey`. [`convert`] translates losslessly between the two, at
//! every depth, and flattens `anyOf` alternatives for display.
//!
//! ## Editing (`session`)
//!
//! [`EditorSession`] owns the editable document and the data instance.
//! Edits address the editable tree by position (`properties.1.value`) and
//! the data instance is re-derived after each one by [`synthesize`].
//! Header edits go through [`header`], which also keeps `id`/`$id`
//! consistent with the declared draft.
//!
//! ## Validation (`validate`, `annotate`)
//!
//! [`SchemaValidator`] checks schema documents (draft, identifier, shape and
//! the draft meta-schema) and data instances (required fields, types and
//! enums). Instance violations are written back onto the offending entries
//! by [`annotate`] so the editor can show them in place.
//!
//! ## Crate Policy
//!
//! - Depends only on `adamant-core` internally.
//! - The editable entry list is the single source of truth while editing;
//!   the canonical map is always derived from it.
//! - All tree transformations are pure. Only [`EditorSession`] holds state.

pub mod annotate;
pub mod config;
pub mod convert;
pub mod error;
pub mod header;
pub mod session;
pub mod synthesize;
pub mod template;
pub mod validate;

pub use adamant_core::{export_file_name, ExportKind};
pub use annotate::{annotate_violations, clear_annotations, editable_path, AnnotationTarget};
pub use config::EngineConfig;
pub use convert::{to_array, to_array_any_of, to_canonical_document, to_editable_document, to_map};
pub use error::{ConfigError, ConvertError, EngineError, ParseError};
pub use header::{apply_header, canonical_header_order, HeaderUpdate};
pub use session::{prepare_export, stamp_schema_id, EditorSession, ValueKind, SCHEMA_ID_KEY};
pub use synthesize::{blueprint, from_editable, prune, rename_data_field};
pub use template::{scratch_document, FILE_TYPE_MARKER};
pub use validate::{SchemaValidator, ValidationViolations, Violation};
