//! # Canonical ⇄ Editable Conversion
//!
//! A JSON Schema stores its fields as a `properties` *map* from field name
//! to schema. The editor works on an ordered *entry list* instead, where
//! each entry is the field's schema with its name stored under `fieldKey`:
//!
//! ```json
//! {"Name": {"type": "string"}, "Age": {"type": "integer"}}
//! ```
//!
//! becomes
//!
//! ```json
//! [{"fieldKey": "Name", "type": "string"}, {"fieldKey": "Age", "type": "integer"}]
//! ```
//!
//! Entries can be addressed by position (`properties.1.value`), which is
//! what makes the list representation editable. Conversion recurses into
//! nested `properties` and into `items` (a single schema or a tuple of
//! schemas) at every depth.
//!
//! [`to_map`] strips the editor-only keys listed in [`EDITABLE_ONLY_KEYS`],
//! so `to_map(to_array(m)) == m` for every property map `m` that does not
//! itself use those keys.

use adamant_core::{json_type_name, FieldPath};
use serde_json::{Map, Value};

use crate::error::ConvertError;

/// Entry key holding the field name.
pub const FIELD_KEY: &str = "fieldKey";
/// Set to `true` on an entry that failed validation.
pub const FIELD_ERROR: &str = "adamant_field_error";
/// Validation message for a flagged entry.
pub const ERROR_DESCRIPTION: &str = "adamant_error_description";
/// Expand/collapse state of an array-of-objects entry.
pub const EXPAND_FLAG: &str = "adamant-ui-specific-expand";
/// Branch index of an entry produced by [`to_array_any_of`].
pub const ANY_OF_BRANCH: &str = "adamant_anyof_branch";
/// The value the user entered for the field.
pub const VALUE: &str = "value";

/// Keys that exist only in the editable representation.
pub const EDITABLE_ONLY_KEYS: [&str; 6] = [
    FIELD_KEY,
    FIELD_ERROR,
    ERROR_DESCRIPTION,
    EXPAND_FLAG,
    ANY_OF_BRANCH,
    VALUE,
];

const PROPERTIES: &str = "properties";
const ITEMS: &str = "items";
const ANY_OF: &str = "anyOf";

/// Convert a canonical property map into an ordered entry list.
///
/// # Errors
///
/// Fails if `properties` is not an object, or if any property schema is not
/// an object. Boolean `items` schemas pass through unchanged.
pub fn to_array(properties: &Value) -> Result<Value, ConvertError> {
    properties_to_array(properties, &FieldPath::root()).map(Value::Array)
}

/// Convert an ordered entry list back into a canonical property map.
///
/// Editor-only keys are dropped at every depth. If two entries share a
/// `fieldKey`, the later entry's schema wins and the field keeps the
/// position of its first occurrence.
///
/// # Errors
///
/// Fails if `entries` (or a nested `properties`) is not an array, or if an
/// entry is not an object with a string `fieldKey`.
pub fn to_map(entries: &Value) -> Result<Value, ConvertError> {
    entries_to_map(entries, &FieldPath::root()).map(Value::Object)
}

/// Like [`to_array`], but every entry holding an `anyOf` list is replaced
/// by one entry per object branch.
///
/// Each branch entry carries the base schema (without `anyOf`) overlaid
/// with the branch's own keywords, the same `fieldKey`, and
/// [`ANY_OF_BRANCH`] set to the branch index. The projection is applied at
/// every depth. It is display-only and is never converted back.
pub fn to_array_any_of(properties: &Value) -> Result<Value, ConvertError> {
    let entries = properties_to_array(properties, &FieldPath::root())?;
    project_any_of(&entries, &FieldPath::root()).map(Value::Array)
}

/// Return a copy of a canonical document with its `properties` converted to
/// the editable entry list. All other keys are copied unchanged.
pub fn to_editable_document(document: &Value) -> Result<Value, ConvertError> {
    map_document_properties(document, |properties| to_array(properties))
}

/// Return a copy of an editable document with its `properties` converted
/// back to a canonical map. All other keys are copied unchanged.
pub fn to_canonical_document(document: &Value) -> Result<Value, ConvertError> {
    map_document_properties(document, |entries| to_map(entries))
}

fn map_document_properties(
    document: &Value,
    convert: impl Fn(&Value) -> Result<Value, ConvertError>,
) -> Result<Value, ConvertError> {
    let Value::Object(map) = document else {
        return Err(ConvertError::NotASchema {
            path: String::new(),
            found: json_type_name(document),
        });
    };
    let mut converted = Map::with_capacity(map.len());
    for (key, value) in map {
        let value = if key == PROPERTIES {
            convert(value)?
        } else {
            value.clone()
        };
        converted.insert(key.clone(), value);
    }
    Ok(Value::Object(converted))
}

fn properties_to_array(properties: &Value, at: &FieldPath) -> Result<Vec<Value>, ConvertError> {
    let Value::Object(map) = properties else {
        return Err(ConvertError::PropertiesShape {
            path: at.to_string(),
            expected: "an object",
            found: json_type_name(properties),
        });
    };
    let mut entries = Vec::with_capacity(map.len());
    for (name, schema) in map {
        let here = at.child(name.as_str());
        let Value::Object(schema) = schema else {
            return Err(ConvertError::NotASchema {
                path: here.to_string(),
                found: json_type_name(schema),
            });
        };
        let mut entry = Map::with_capacity(schema.len() + 1);
        entry.insert(FIELD_KEY.to_string(), Value::String(name.clone()));
        entry.extend(schema_to_editable(schema, &here)?);
        entries.push(Value::Object(entry));
    }
    Ok(entries)
}

fn schema_to_editable(
    schema: &Map<String, Value>,
    at: &FieldPath,
) -> Result<Map<String, Value>, ConvertError> {
    let mut converted = Map::with_capacity(schema.len());
    for (key, value) in schema {
        let value = match key.as_str() {
            PROPERTIES => Value::Array(properties_to_array(value, &at.child(PROPERTIES))?),
            ITEMS => items_to_editable(value, &at.child(ITEMS))?,
            _ => value.clone(),
        };
        converted.insert(key.clone(), value);
    }
    Ok(converted)
}

fn items_to_editable(items: &Value, at: &FieldPath) -> Result<Value, ConvertError> {
    match items {
        Value::Object(schema) => Ok(Value::Object(schema_to_editable(schema, at)?)),
        Value::Array(schemas) => schemas
            .iter()
            .enumerate()
            .map(|(index, schema)| items_to_editable(schema, &at.child(index)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

fn entries_to_map(entries: &Value, at: &FieldPath) -> Result<Map<String, Value>, ConvertError> {
    let Value::Array(entries) = entries else {
        return Err(ConvertError::PropertiesShape {
            path: at.to_string(),
            expected: "an array",
            found: json_type_name(entries),
        });
    };
    let mut map = Map::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Some((name, schema)) = entry.as_object().and_then(|schema| {
            let name = schema.get(FIELD_KEY).and_then(Value::as_str)?;
            Some((name, schema))
        }) else {
            return Err(ConvertError::MissingFieldKey {
                path: at.to_string(),
                index,
            });
        };
        let schema = schema_to_canonical(schema, &at.child(name))?;
        if map.insert(name.to_string(), Value::Object(schema)).is_some() {
            tracing::warn!(field = %name, path = %at, "duplicate fieldKey, later entry wins");
        }
    }
    Ok(map)
}

fn schema_to_canonical(
    schema: &Map<String, Value>,
    at: &FieldPath,
) -> Result<Map<String, Value>, ConvertError> {
    let mut converted = Map::with_capacity(schema.len());
    for (key, value) in schema {
        if EDITABLE_ONLY_KEYS.contains(&key.as_str()) {
            continue;
        }
        let value = match key.as_str() {
            PROPERTIES => Value::Object(entries_to_map(value, &at.child(PROPERTIES))?),
            ITEMS => items_to_canonical(value, &at.child(ITEMS))?,
            _ => value.clone(),
        };
        converted.insert(key.clone(), value);
    }
    Ok(converted)
}

fn items_to_canonical(items: &Value, at: &FieldPath) -> Result<Value, ConvertError> {
    match items {
        Value::Object(schema) => Ok(Value::Object(schema_to_canonical(schema, at)?)),
        Value::Array(schemas) => schemas
            .iter()
            .enumerate()
            .map(|(index, schema)| items_to_canonical(schema, &at.child(index)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

fn project_any_of(entries: &[Value], at: &FieldPath) -> Result<Vec<Value>, ConvertError> {
    let mut projected = Vec::with_capacity(entries.len());
    for entry in entries {
        let Value::Object(entry) = entry else {
            projected.push(entry.clone());
            continue;
        };
        let name = entry.get(FIELD_KEY).and_then(Value::as_str).unwrap_or_default();
        let here = at.child(name);
        for mut variant in any_of_variants(entry, &here)? {
            if let Some(Value::Array(nested)) = variant.get(PROPERTIES) {
                let nested = project_any_of(nested, &here.child(PROPERTIES))?;
                variant.insert(PROPERTIES.to_string(), Value::Array(nested));
            }
            projected.push(Value::Object(variant));
        }
    }
    Ok(projected)
}

fn any_of_variants(
    entry: &Map<String, Value>,
    at: &FieldPath,
) -> Result<Vec<Map<String, Value>>, ConvertError> {
    let branches: Vec<(usize, &Map<String, Value>)> = match entry.get(ANY_OF) {
        Some(Value::Array(branches)) => branches
            .iter()
            .enumerate()
            .filter_map(|(index, branch)| branch.as_object().map(|branch| (index, branch)))
            .collect(),
        _ => Vec::new(),
    };
    if branches.is_empty() {
        return Ok(vec![entry.clone()]);
    }

    let mut base = entry.clone();
    base.shift_remove(ANY_OF);
    let field_key = base.get(FIELD_KEY).cloned();

    let mut variants = Vec::with_capacity(branches.len());
    for (index, branch) in branches {
        let mut variant = base.clone();
        variant.extend(schema_to_editable(branch, &at.child(ANY_OF).child(index))?);
        if let Some(field_key) = &field_key {
            variant.insert(FIELD_KEY.to_string(), field_key.clone());
        }
        variant.insert(ANY_OF_BRANCH.to_string(), Value::from(index));
        variants.push(variant);
    }
    tracing::debug!(path = %at, branches = variants.len(), "flattened anyOf");
    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(value: &Value) -> Vec<String> {
        value.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn to_array_emits_entries_in_map_order() {
        let properties = json!({
            "Zeta": {"type": "string"},
            "Alpha": {"type": "integer", "title": "A"},
        });
        let entries = to_array(&properties).unwrap();
        assert_eq!(
            entries,
            json!([
                {"fieldKey": "Zeta", "type": "string"},
                {"fieldKey": "Alpha", "type": "integer", "title": "A"},
            ])
        );
        assert_eq!(keys(&entries[1]), ["fieldKey", "type", "title"]);
    }

    #[test]
    fn to_array_recurses_into_properties_and_items() {
        let properties = json!({
            "Address": {"type": "object", "properties": {"City": {"type": "string"}}},
            "Samples": {
                "type": "array",
                "items": {"type": "object", "properties": {"Mass": {"type": "number"}}}
            },
            "Pair": {"type": "array", "items": [{"properties": {"X": {}}}, {"type": "string"}]}
        });
        let entries = to_array(&properties).unwrap();
        assert_eq!(entries[0]["properties"], json!([{"fieldKey": "City", "type": "string"}]));
        assert_eq!(
            entries[1]["items"]["properties"],
            json!([{"fieldKey": "Mass", "type": "number"}])
        );
        assert_eq!(entries[2]["items"][0]["properties"], json!([{"fieldKey": "X"}]));
    }

    #[test]
    fn to_map_inverts_to_array() {
        let properties = json!({
            "Name": {"type": "string", "default": "x"},
            "Address": {
                "type": "object",
                "properties": {"City": {"type": "string"}, "Zip": {"type": "string"}},
                "required": ["City"]
            },
            "Tags": {"type": "array", "items": {"type": "string", "enum": ["a", "b"]}}
        });
        let back = to_map(&to_array(&properties).unwrap()).unwrap();
        assert_eq!(back, properties);
        assert_eq!(keys(&back), ["Name", "Address", "Tags"]);
        assert_eq!(keys(&back["Address"]["properties"]), ["City", "Zip"]);
    }

    #[test]
    fn to_map_strips_editor_keys_at_every_depth() {
        let entries = json!([{
            "fieldKey": "Group",
            "type": "object",
            "adamant-ui-specific-expand": true,
            "properties": [{
                "fieldKey": "Inner",
                "type": "string",
                "value": "typed",
                "adamant_field_error": true,
                "adamant_error_description": "Inner is required"
            }]
        }]);
        let map = to_map(&entries).unwrap();
        assert_eq!(
            map,
            json!({"Group": {"type": "object", "properties": {"Inner": {"type": "string"}}}})
        );
    }

    #[test]
    fn to_map_duplicate_field_key_later_wins_first_position() {
        let entries = json!([
            {"fieldKey": "a", "type": "string"},
            {"fieldKey": "b", "type": "string"},
            {"fieldKey": "a", "type": "number"}
        ]);
        let map = to_map(&entries).unwrap();
        assert_eq!(keys(&map), ["a", "b"]);
        assert_eq!(map["a"], json!({"type": "number"}));
    }

    #[test]
    fn to_map_rejects_missing_field_key() {
        let err = to_map(&json!([{"fieldKey": "a"}, {"type": "string"}])).unwrap_err();
        assert_eq!(
            err,
            ConvertError::MissingFieldKey {
                path: String::new(),
                index: 1
            }
        );
        assert!(to_map(&json!([{"fieldKey": 7}])).is_err());
    }

    #[test]
    fn shape_errors_name_the_location() {
        let err = to_array(&json!({"A": {"properties": [1]}})).unwrap_err();
        assert_eq!(
            err,
            ConvertError::PropertiesShape {
                path: "A.properties".to_string(),
                expected: "an object",
                found: "array",
            }
        );
        let err = to_array(&json!({"A": "string"})).unwrap_err();
        assert!(matches!(err, ConvertError::NotASchema { found: "string", .. }));
        assert!(to_map(&json!({"A": {}})).is_err());
    }

    #[test]
    fn empty_properties() {
        assert_eq!(to_array(&json!({})).unwrap(), json!([]));
        assert_eq!(to_map(&json!([])).unwrap(), json!({}));
    }

    #[test]
    fn documents_convert_only_properties() {
        let doc = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "$id": "run",
            "properties": {"A": {"type": "string"}},
            "required": ["A"]
        });
        let editable = to_editable_document(&doc).unwrap();
        assert_eq!(editable["properties"], json!([{"fieldKey": "A", "type": "string"}]));
        assert_eq!(editable["required"], json!(["A"]));
        assert_eq!(keys(&editable), keys(&doc));
        assert_eq!(to_canonical_document(&editable).unwrap(), doc);
    }

    #[test]
    fn document_without_properties_is_copied() {
        let doc = json!({"title": "Empty"});
        assert_eq!(to_editable_document(&doc).unwrap(), doc);
        assert!(to_editable_document(&json!([])).is_err());
    }

    #[test]
    fn any_of_flattens_branches() {
        let properties = json!({
            "Plain": {"type": "string"},
            "Source": {
                "title": "Source",
                "anyOf": [
                    {"type": "string", "title": "Name"},
                    {"type": "object", "properties": {"Url": {"type": "string"}}},
                    true
                ]
            }
        });
        let projected = to_array_any_of(&properties).unwrap();
        let projected = projected.as_array().unwrap();
        assert_eq!(projected.len(), 3);
        assert_eq!(projected[0], json!({"fieldKey": "Plain", "type": "string"}));
        assert_eq!(
            projected[1],
            json!({"fieldKey": "Source", "title": "Name", "type": "string", "adamant_anyof_branch": 0})
        );
        assert_eq!(projected[2]["fieldKey"], "Source");
        assert_eq!(projected[2]["adamant_anyof_branch"], 1);
        assert_eq!(projected[2]["properties"], json!([{"fieldKey": "Url", "type": "string"}]));
        assert!(projected[2].get("anyOf").is_none());
    }

    #[test]
    fn any_of_applies_to_nested_entries() {
        let properties = json!({
            "Outer": {
                "type": "object",
                "properties": {"Inner": {"anyOf": [{"type": "string"}, {"type": "number"}]}}
            }
        });
        let projected = to_array_any_of(&properties).unwrap();
        let inner = projected[0]["properties"].as_array().unwrap();
        assert_eq!(inner.len(), 2);
        assert_eq!(inner[1], json!({"fieldKey": "Inner", "type": "number", "adamant_anyof_branch": 1}));
    }
}
