//! # Editor Session
//!
//! [`EditorSession`] holds everything the editor works on for one schema:
//!
//! - the canonical document as loaded, kept for [`revert`](EditorSession::revert);
//! - the editable document, whose `properties` is the ordered entry list.
//!   It is the single source of truth while editing. The canonical form is
//!   derived from it on demand, never the reverse;
//! - the data instance, re-derived from the editable document after every
//!   edit. Entered values travel on the entries under `value`.
//!
//! Every mutating method computes all new values first and assigns them only
//! once nothing can fail, so an error never leaves a session half-updated.

use adamant_core::{path, Draft, FieldPath, PathSegment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::annotate::{annotate_violations, clear_annotations};
use crate::config::EngineConfig;
use crate::convert::{to_array_any_of, to_canonical_document, to_editable_document, FIELD_KEY, VALUE};
use crate::error::{EngineError, ParseError};
use crate::header::{apply_header, HeaderUpdate};
use crate::synthesize::{from_editable, prune, rename_data_field};
use crate::template::scratch_document;
use crate::validate::{SchemaValidator, ValidationViolations, Violation};

/// Key added to exported data instances naming their schema.
pub const SCHEMA_ID_KEY: &str = "SchemaID";

/// How the text of a field edit should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Free text.
    String,
    /// Any number.
    Number,
    /// Whole number.
    Integer,
    /// `true` / `false`.
    Boolean,
    /// A JSON array.
    Array,
}

impl ValueKind {
    /// Coerce textual input to this kind. Input that does not parse is
    /// returned unchanged, so the validator can report it.
    pub fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (Self::String, Value::Number(n)) => Value::String(n.to_string()),
            (Self::String, Value::Bool(b)) => Value::String(b.to_string()),
            (Self::Integer, Value::String(text)) => match text.trim().parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => Value::String(text),
            },
            (Self::Number, Value::String(text)) => {
                let trimmed = text.trim();
                if let Ok(n) = trimmed.parse::<i64>() {
                    Value::from(n)
                } else if let Some(n) = trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                {
                    Value::Number(n)
                } else {
                    Value::String(text)
                }
            }
            (Self::Boolean, Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(text),
            },
            (Self::Array, Value::String(text)) => match serde_json::from_str::<Value>(&text) {
                Ok(array @ Value::Array(_)) => array,
                _ => Value::String(text),
            },
            (_, other) => other,
        }
    }
}

/// Editing state for one schema document and its data instance.
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: EngineConfig,
    validator: SchemaValidator,
    schema_name: Option<String>,
    loaded: Value,
    loaded_editable: Value,
    editable: Value,
    instance: Value,
}

impl EditorSession {
    /// Parse a schema document from JSON text and open it for editing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Parse`] for malformed JSON, a non-object root
    /// or a `properties` tree that cannot be converted.
    pub fn load_schema(raw: &str, config: EngineConfig) -> Result<Self, EngineError> {
        let document: Value = serde_json::from_str(raw).map_err(ParseError::from)?;
        Self::from_document(document, config)
    }

    /// Open an already parsed canonical document for editing.
    pub fn from_document(document: Value, config: EngineConfig) -> Result<Self, EngineError> {
        if !document.is_object() {
            return Err(ParseError::NotAnObject(adamant_core::json_type_name(&document)).into());
        }
        let editable = to_editable_document(&document).map_err(ParseError::from)?;
        let instance = derive_instance(&editable);
        let fields = editable
            .get("properties")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        tracing::debug!(fields, "schema loaded");
        Ok(Self {
            validator: SchemaValidator::new(&config),
            config,
            schema_name: None,
            loaded: document,
            loaded_editable: editable.clone(),
            editable,
            instance,
        })
    }

    /// Start from the built-in metadata template.
    pub fn from_scratch(config: EngineConfig, now: DateTime<Utc>) -> Result<Self, EngineError> {
        Self::from_document(scratch_document(now), config)
    }

    /// Attach the file name the schema was selected under.
    pub fn with_schema_name(mut self, name: impl Into<String>) -> Self {
        self.schema_name = Some(name.into());
        self
    }

    /// The schema file name, if known.
    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The editable document.
    pub fn editable(&self) -> &Value {
        &self.editable
    }

    /// The current data instance.
    pub fn instance(&self) -> &Value {
        &self.instance
    }

    /// The canonical document as it was loaded.
    pub fn loaded(&self) -> &Value {
        &self.loaded
    }

    /// The canonical document derived from the editable one.
    pub fn canonical(&self) -> Result<Value, EngineError> {
        Ok(to_canonical_document(&self.editable)?)
    }

    /// The current fields with `anyOf` alternatives flattened for display.
    pub fn any_of_projection(&self) -> Result<Value, EngineError> {
        let canonical = self.canonical()?;
        match canonical.get("properties") {
            Some(properties) => Ok(to_array_any_of(properties)?),
            None => Ok(Value::Array(Vec::new())),
        }
    }

    /// Write `value` at `path` in the editable document, then re-derive the
    /// data instance. Returns the updated editable document and instance.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPath`] if `path` is malformed or passes
    /// through a scalar.
    pub fn on_field_edit(
        &mut self,
        path: &str,
        value: Value,
        kind: ValueKind,
    ) -> Result<(&Value, &Value), EngineError> {
        let at = FieldPath::parse(path)?;
        let editable = path::set(&self.editable, &at, kind.coerce(value))?;
        let instance = derive_instance(&editable);
        tracing::debug!(path = %at, "field edited");
        self.editable = editable;
        self.instance = instance;
        Ok((&self.editable, &self.instance))
    }

    /// Clear the data stored at `data_path` (a path into the instance).
    ///
    /// A path naming a field clears its entered value; a group is cleared
    /// with everything below it and drops out of the instance. A path
    /// reaching inside a field's value deletes that part of the value,
    /// pruning containers left empty. Enclosing groups left without data
    /// are cleared too. Unknown paths change nothing.
    pub fn on_field_delete(&mut self, data_path: &str) -> Result<&Value, EngineError> {
        let at = FieldPath::parse(data_path)?;
        let Some(located) = locate_entry(&self.editable, &at) else {
            tracing::debug!(path = %at, "nothing stored at path");
            return Ok(&self.instance);
        };
        let Some(entry) = path::get(&self.editable, &located.entry) else {
            return Ok(&self.instance);
        };

        let updated_entry = if located.rest.is_empty() {
            clear_values(entry)
        } else {
            let field: FieldPath = at.segments()[..located.consumed].iter().cloned().collect();
            let current = path::get(&self.instance, &field).cloned().unwrap_or(Value::Null);
            let rest: FieldPath = located.rest.iter().cloned().collect();
            let remaining = path::delete(&current, &rest).unwrap_or(Value::Null);
            path::set(entry, &FieldPath::root().child(VALUE), remaining)?
        };

        let mut editable = path::set(&self.editable, &located.entry, updated_entry)?;
        let mut depth = located.entry.len();
        while depth > 2 {
            depth -= 2;
            let group: FieldPath = located.entry.segments()[..depth].iter().cloned().collect();
            let holds_data = path::get(&editable, &group.child("properties"))
                .map(from_editable)
                .and_then(|nested| nested.as_object().map(|m| !m.is_empty()))
                .unwrap_or(false);
            if holds_data {
                break;
            }
            editable = path::set(&editable, &group.child(VALUE), Value::Null)?;
        }
        let instance = derive_instance(&editable);
        tracing::debug!(path = %at, "field data deleted");
        self.editable = editable;
        self.instance = instance;
        Ok(&self.instance)
    }

    /// Remove the node at `editable_path` from the editable document.
    /// Containers left empty by the removal are removed as well.
    pub fn on_schema_field_delete(&mut self, editable_path: &str) -> Result<&Value, EngineError> {
        let at = FieldPath::parse(editable_path)?;
        let editable = path::delete(&self.editable, &at).unwrap_or_else(|| Value::Object(Map::new()));
        let instance = derive_instance(&editable);
        tracing::debug!(path = %at, "schema field deleted");
        self.editable = editable;
        self.instance = instance;
        Ok(&self.editable)
    }

    /// Rename the data field at `data_path` to `new_key`.
    ///
    /// For a schema field this renames the entry, keeping its position and
    /// its entered value, and updates the enclosing `required` list. Inside
    /// a field's value the key is renamed in place.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SchemaInvalid`] if a sibling field is already
    /// called `new_key` or `new_key` is blank.
    pub fn on_field_rename(&mut self, data_path: &str, new_key: &str) -> Result<&Value, EngineError> {
        let at = FieldPath::parse(data_path)?;
        if new_key.trim().is_empty() {
            return Err(EngineError::schema_invalid("Field name cannot be empty."));
        }
        let Some(located) = locate_entry(&self.editable, &at) else {
            return Ok(&self.instance);
        };

        let editable = if located.rest.is_empty() {
            rename_entry(&self.editable, &located.entry, new_key)?
        } else {
            let value_path = located.entry.child(VALUE);
            let Some(current) = path::get(&self.editable, &value_path) else {
                return Ok(&self.instance);
            };
            let rest: FieldPath = located.rest.iter().cloned().collect();
            let renamed = rename_data_field(current, &rest, new_key)?;
            path::set(&self.editable, &value_path, renamed)?
        };

        let instance = derive_instance(&editable);
        tracing::debug!(path = %at, new_key, "field renamed");
        self.editable = editable;
        self.instance = instance;
        Ok(&self.instance)
    }

    /// Apply a header edit to the editable document.
    pub fn on_header_save(&mut self, update: &HeaderUpdate) -> Result<&Value, EngineError> {
        let editable = apply_header(&self.editable, update, &self.config)?;
        self.editable = editable;
        Ok(&self.editable)
    }

    /// Validate the current document. Returns its draft when valid.
    pub fn compile(&self) -> Result<Draft, EngineError> {
        let canonical = self.canonical()?;
        self.validator.validate_document(&canonical)
    }

    /// Returns true if `candidate` is already used as an identifier
    /// anywhere in the document. Entered values and defaults are not
    /// identifiers.
    pub fn check_id_exists(&self, candidate: &str) -> bool {
        self.validator.check_id_exists(&self.editable, candidate)
    }

    /// Produce the data instance for export.
    ///
    /// The instance is re-derived, pruned and validated against the
    /// canonical document. On failure the violations are annotated onto the
    /// editable document. On success previous annotations are cleared and,
    /// when configured and the schema name is known, the instance is
    /// stamped with [`SCHEMA_ID_KEY`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InstanceInvalid`] with every violation. An
    /// empty instance is itself a violation.
    pub fn export_data_instance(&mut self) -> Result<Value, EngineError> {
        let canonical = self.canonical()?;
        let derived = derive_instance(&self.editable);
        let pruned = match prepare_export(&self.validator, &canonical, &derived) {
            Ok(pruned) => pruned,
            Err(EngineError::InstanceInvalid { violations }) => {
                self.editable = annotate_violations(&self.editable, &violations, &self.config);
                return Err(EngineError::InstanceInvalid { violations });
            }
            Err(other) => return Err(other),
        };

        self.editable = clear_annotations(&self.editable);
        self.instance = derived;
        let exported = match (&self.schema_name, self.config.stamp_schema_id) {
            (Some(name), true) => stamp_schema_id(&pruned, name),
            _ => pruned,
        };
        tracing::info!("data instance exported");
        Ok(exported)
    }

    /// Discard all edits and return to the document as loaded.
    pub fn revert(&mut self) {
        self.editable = self.loaded_editable.clone();
        self.instance = derive_instance(&self.editable);
        tracing::debug!("session reverted");
    }
}

/// Prune `instance` and validate the result against the canonical
/// `schema`. Returns the pruned instance.
///
/// # Errors
///
/// Returns [`EngineError::InstanceInvalid`] with every violation. An
/// instance that prunes to nothing fails with "form data is empty".
pub fn prepare_export(
    validator: &SchemaValidator,
    schema: &Value,
    instance: &Value,
) -> Result<Value, EngineError> {
    let pruned = prune(instance).unwrap_or_else(|| Value::Object(Map::new()));
    let mut violations = match validator.validate_instance(&pruned, schema) {
        Ok(()) => ValidationViolations::default(),
        Err(EngineError::InstanceInvalid { violations }) => violations,
        Err(other) => return Err(other),
    };
    if violations.is_empty() && pruned.as_object().is_some_and(Map::is_empty) {
        violations.push(Violation::new("", "form data is empty"));
    }
    if violations.is_empty() {
        Ok(pruned)
    } else {
        tracing::info!(count = violations.len(), "export rejected");
        Err(EngineError::InstanceInvalid { violations })
    }
}

/// Return a copy of `instance` carrying [`SCHEMA_ID_KEY`] set to
/// `schema_name` without its `.json` extension. Non-object instances are
/// returned unchanged.
pub fn stamp_schema_id(instance: &Value, schema_name: &str) -> Value {
    let mut stamped = instance.clone();
    if let Value::Object(map) = &mut stamped {
        let id = schema_name.strip_suffix(".json").unwrap_or(schema_name);
        map.insert(SCHEMA_ID_KEY.to_string(), Value::from(id));
    }
    stamped
}

fn derive_instance(editable: &Value) -> Value {
    editable
        .get("properties")
        .map(from_editable)
        .unwrap_or_else(|| Value::Object(Map::new()))
}

/// A data path resolved against the editable document.
struct LocatedEntry {
    /// Editable path of the deepest entry named by the data path.
    entry: FieldPath,
    /// Number of data path segments consumed to reach the entry.
    consumed: usize,
    /// The remaining data path segments, addressing inside the entry's value.
    rest: Vec<PathSegment>,
}

fn locate_entry(editable: &Value, data_path: &FieldPath) -> Option<LocatedEntry> {
    let mut entry = FieldPath::root();
    let mut node = editable;
    let mut consumed = 0;

    for segment in data_path.segments() {
        let Some(entries) = node.get("properties").and_then(Value::as_array) else {
            break;
        };
        let PathSegment::Field(name) = segment else {
            return None;
        };
        let index = entries
            .iter()
            .position(|e| e.get(FIELD_KEY).and_then(Value::as_str) == Some(name.as_str()))?;
        entry.push("properties");
        entry.push(index);
        node = &entries[index];
        consumed += 1;
    }

    if consumed == 0 {
        return None;
    }
    Some(LocatedEntry {
        entry,
        consumed,
        rest: data_path.segments()[consumed..].to_vec(),
    })
}

/// Mark an entry and every entry below it as cleared.
fn clear_values(entry: &Value) -> Value {
    let Value::Object(map) = entry else {
        return entry.clone();
    };
    let mut cleared = map.clone();
    if let Some(Value::Array(nested)) = map.get("properties") {
        cleared.insert(
            "properties".to_string(),
            Value::Array(nested.iter().map(clear_values).collect()),
        );
    }
    cleared.insert(VALUE.to_string(), Value::Null);
    Value::Object(cleared)
}

fn rename_entry(editable: &Value, entry: &FieldPath, new_key: &str) -> Result<Value, EngineError> {
    let Some(old_key) = path::get(editable, &entry.child(FIELD_KEY))
        .and_then(Value::as_str)
        .map(str::to_string)
    else {
        return Ok(editable.clone());
    };
    if old_key == new_key {
        return Ok(editable.clone());
    }

    // `entry` ends in `properties.<index>`; the owner holds `required`.
    let owner: FieldPath = entry.segments()[..entry.len() - 2].iter().cloned().collect();
    let taken = path::get(editable, &owner.child("properties"))
        .and_then(Value::as_array)
        .is_some_and(|siblings| {
            siblings
                .iter()
                .any(|s| s.get(FIELD_KEY).and_then(Value::as_str) == Some(new_key))
        });
    if taken {
        return Err(EngineError::schema_invalid(format!(
            "A field named '{new_key}' already exists."
        )));
    }

    let mut renamed = path::set(editable, &entry.child(FIELD_KEY), Value::from(new_key))?;
    let required_path = owner.child("required");
    if let Some(Value::Array(required)) = path::get(&renamed, &required_path) {
        let required: Vec<Value> = required
            .iter()
            .map(|name| {
                if name.as_str() == Some(old_key.as_str()) {
                    Value::from(new_key)
                } else {
                    name.clone()
                }
            })
            .collect();
        renamed = path::set(&renamed, &required_path, Value::Array(required))?;
    }
    Ok(renamed)
}
