//! # Form Data Synthesis
//!
//! Derives data instances from schemas.
//!
//! - [`blueprint`] builds the initial instance for a freshly selected schema
//!   from its declared defaults.
//! - [`from_editable`] rebuilds the instance from the editable entry list,
//!   which carries the user's entered values under `value`. The session
//!   calls it after every edit so schema and data never drift apart.
//! - [`prune`] drops untouched optional fields before validation and export.
//!
//! Initial values follow one rule for non-object fields: `default` if
//! declared, else the first `enum` member, else `false` for booleans, else
//! the field is left unset.

use adamant_core::{path, FieldPath, PathError};
use serde_json::{Map, Value};

use crate::convert::{FIELD_KEY, VALUE};

/// Build the initial data instance for a canonical property map.
///
/// Object fields with nested `properties` become nested instances; object
/// fields without them are omitted. A non-object input yields `{}`.
pub fn blueprint(properties: &Value) -> Value {
    let mut instance = Map::new();
    let Some(properties) = properties.as_object() else {
        return Value::Object(instance);
    };
    for (name, schema) in properties {
        if declared_type(schema) == Some("object") {
            if let Some(nested) = schema.get("properties").filter(|p| p.is_object()) {
                instance.insert(name.clone(), blueprint(nested));
            }
        } else if let Some(initial) = initial_value(schema) {
            instance.insert(name.clone(), initial);
        }
    }
    Value::Object(instance)
}

/// Build the data instance described by an editable entry list.
///
/// An entry's `value` takes precedence over its declared defaults; a `null`
/// value marks a field the user cleared, which stays unset. Object entries
/// with a nested entry list are rebuilt recursively; a cleared group is
/// left out while nothing below it holds data. Entries without a string
/// `fieldKey` are skipped.
pub fn from_editable(entries: &Value) -> Value {
    let mut instance = Map::new();
    let Some(entries) = entries.as_array() else {
        return Value::Object(instance);
    };
    for entry in entries {
        let Some(name) = entry.get(FIELD_KEY).and_then(Value::as_str) else {
            continue;
        };
        if declared_type(entry) == Some("object") {
            if let Some(nested) = entry.get("properties").filter(|p| p.is_array()) {
                let group = from_editable(nested);
                let cleared = matches!(entry.get(VALUE), Some(Value::Null));
                if !(cleared && group.as_object().is_some_and(Map::is_empty)) {
                    instance.insert(name.to_string(), group);
                }
            }
            continue;
        }
        let value = match entry.get(VALUE) {
            Some(Value::Null) => None,
            Some(entered) => Some(entered.clone()),
            None => initial_value(entry),
        };
        if let Some(value) = value {
            instance.insert(name.to_string(), value);
        }
    }
    Value::Object(instance)
}

/// Remove unset values from a data instance.
///
/// Empty strings, `null`s and objects that prune to nothing are removed.
/// Array elements that prune to nothing are dropped, but the array itself
/// is kept even when it ends up empty. Returns `None` when nothing is left.
pub fn prune(instance: &Value) -> Option<Value> {
    match instance {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .iter()
                .filter_map(|(key, value)| prune(value).map(|value| (key.clone(), value)))
                .collect();
            (!pruned.is_empty()).then_some(Value::Object(pruned))
        }
        Value::Array(items) => Some(Value::Array(items.iter().filter_map(prune).collect())),
        scalar => Some(scalar.clone()),
    }
}

/// Move the value stored at `path` to the sibling key `new_key`, keeping
/// its position among its siblings.
///
/// Nothing changes when the last segment already equals `new_key` or when
/// nothing is stored at `path`. An existing `new_key` sibling is replaced.
///
/// # Errors
///
/// Returns [`PathError::InvalidPath`] if the parent of `path` is not an
/// object.
pub fn rename_data_field(instance: &Value, at: &FieldPath, new_key: &str) -> Result<Value, PathError> {
    let (Some(parent), Some(last)) = (at.parent(), at.last()) else {
        return Ok(instance.clone());
    };
    let old_key = last.as_key();
    if old_key == new_key || path::get(instance, at).is_none() {
        return Ok(instance.clone());
    }
    let Some(Value::Object(siblings)) = path::get(instance, &parent) else {
        return Err(PathError::InvalidPath {
            path: parent.to_string(),
            found: "array",
        });
    };

    let mut renamed = Map::with_capacity(siblings.len());
    for (key, value) in siblings {
        if key == old_key.as_ref() {
            renamed.insert(new_key.to_string(), value.clone());
        } else if key != new_key {
            renamed.insert(key.clone(), value.clone());
        }
    }
    tracing::debug!(path = %at, new_key, "renamed data field");
    path::set(instance, &parent, Value::Object(renamed))
}

/// The declared `type` of a schema or entry. For a type list, the first
/// non-`null` member.
pub(crate) fn declared_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(name) => Some(name),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .find(|name| *name != "null"),
        _ => None,
    }
}

fn initial_value(schema: &Value) -> Option<Value> {
    if let Some(default) = schema.get("default") {
        return Some(default.clone());
    }
    if let Some(first) = schema.get("enum").and_then(Value::as_array).and_then(|e| e.first()) {
        return Some(first.clone());
    }
    (declared_type(schema) == Some("boolean")).then_some(Value::Bool(false))
}
