//! # Header Assembly
//!
//! The header of a schema document is its draft URI, identifier, title and
//! description. Saving a header edit rewrites those keys, files the
//! identifier under the keyword the draft expects, renames every nested
//! identifier to match, and puts the document's keys into canonical order:
//!
//! `$schema, $id, id, title, description, type, properties, required`,
//! followed by any other keys in their existing relative order.
//!
//! Load tolerates any key order. Once a header has been saved, canonical
//! order is what the document keeps.

use adamant_core::{normalize_identifiers, Draft, SchemaId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Header keys in the order they are serialized.
pub const HEADER_ORDER: [&str; 8] = [
    "$schema",
    "$id",
    "id",
    "title",
    "description",
    "type",
    "properties",
    "required",
];

/// A header edit. Absent or blank fields remove the corresponding key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderUpdate {
    /// The `$schema` draft URI.
    pub schema_version: Option<String>,
    /// The schema identifier.
    pub id: Option<String>,
    /// Human-readable title.
    pub title: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

/// Return a copy of `document` with its keys in canonical header order.
/// Non-object values are returned unchanged.
pub fn canonical_header_order(document: &Value) -> Value {
    let Value::Object(map) = document else {
        return document.clone();
    };
    let mut ordered = Map::with_capacity(map.len());
    for key in HEADER_ORDER {
        if let Some(value) = map.get(key) {
            ordered.insert(key.to_string(), value.clone());
        }
    }
    for (key, value) in map {
        if !HEADER_ORDER.contains(&key.as_str()) {
            ordered.insert(key.clone(), value.clone());
        }
    }
    Value::Object(ordered)
}

/// Apply a header edit to an editable document.
///
/// The draft comes from `update.schema_version`, or from
/// [`EngineConfig::default_draft`] when that is blank. The identifier is
/// stored under the draft's keyword, and [`normalize_identifiers`] is
/// applied to `properties`.
///
/// # Errors
///
/// Returns [`EngineError::SchemaInvalid`] if the identifier is not a valid
/// table name or the schema version is not a supported draft. The input
/// document is never modified.
pub fn apply_header(
    document: &Value,
    update: &HeaderUpdate,
    config: &EngineConfig,
) -> Result<Value, EngineError> {
    let id = non_blank(&update.id)
        .map(SchemaId::new)
        .transpose()
        .map_err(|e| EngineError::schema_invalid(e.to_string()))?;

    let version = non_blank(&update.schema_version);
    let draft = match version {
        Some(uri) => Draft::from_uri(uri).ok_or_else(|| {
            EngineError::schema_invalid(format!("Unsupported schema version '{uri}'."))
        })?,
        None => config.default_draft,
    };

    let Value::Object(header) = document else {
        return Err(EngineError::schema_invalid("Schema document must be a JSON object."));
    };
    let mut header = header.clone();

    match version {
        Some(_) => header.insert("$schema".to_string(), Value::from(draft.uri())),
        None => header.shift_remove("$schema"),
    };

    header.shift_remove("id");
    header.shift_remove("$id");
    if let Some(id) = id {
        header.insert(draft.id_keyword().to_string(), Value::from(id.into_inner()));
    }

    for (key, value) in [("title", &update.title), ("description", &update.description)] {
        match non_blank(value) {
            Some(text) => header.insert(key.to_string(), Value::from(text)),
            None => header.shift_remove(key),
        };
    }

    if let Some(properties) = header.get("properties") {
        let normalized = normalize_identifiers(properties, draft);
        header.insert("properties".to_string(), normalized);
    }

    tracing::debug!(draft = %draft, "applied header update");
    Ok(canonical_header_order(&Value::Object(header)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(value: &Value) -> Vec<String> {
        value.as_object().unwrap().keys().cloned().collect()
    }

    fn update(version: &str, id: &str) -> HeaderUpdate {
        HeaderUpdate {
            schema_version: Some(version.to_string()),
            id: Some(id.to_string()),
            title: Some("Run".to_string()),
            description: Some("A run".to_string()),
        }
    }

    #[test]
    fn canonical_order_puts_header_first() {
        let doc = json!({
            "x-extra": 1,
            "required": [],
            "properties": {},
            "title": "T",
            "$schema": "s",
            "definitions": {},
            "$id": "i",
        });
        let ordered = canonical_header_order(&doc);
        assert_eq!(
            keys(&ordered),
            ["$schema", "$id", "title", "properties", "required", "x-extra", "definitions"]
        );
        assert_eq!(canonical_header_order(&ordered), ordered);
        assert_eq!(keys(&canonical_header_order(&ordered)), keys(&ordered));
    }

    #[test]
    fn draft04_stores_id_and_renames_nested() {
        let doc = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "$id": "old",
            "type": "object",
            "properties": [{"fieldKey": "Sample", "$id": "sample"}]
        });
        let saved = apply_header(
            &doc,
            &update("http://json-schema.org/draft-04/schema#", "run_04"),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(saved["id"], "run_04");
        assert!(saved.get("$id").is_none());
        assert_eq!(saved["properties"][0]["id"], "sample");
        assert_eq!(
            keys(&saved),
            ["$schema", "id", "title", "description", "type", "properties"]
        );
    }

    #[test]
    fn draft07_stores_dollar_id() {
        let doc = json!({"id": "old", "properties": [{"fieldKey": "A", "id": "a"}]});
        let saved = apply_header(
            &doc,
            &update("http://json-schema.org/draft-07/schema#", "run_07"),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(saved["$id"], "run_07");
        assert!(saved.get("id").is_none());
        assert_eq!(saved["properties"][0]["$id"], "a");
    }

    #[test]
    fn blank_fields_remove_keys() {
        let doc = json!({"$schema": "x", "$id": "a", "title": "T", "description": "D"});
        let saved = apply_header(
            &doc,
            &HeaderUpdate {
                schema_version: Some("  ".to_string()),
                ..HeaderUpdate::default()
            },
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(saved, json!({}));
    }

    #[test]
    fn blank_version_uses_configured_draft() {
        let config = EngineConfig {
            default_draft: Draft::Draft04,
            ..EngineConfig::default()
        };
        let saved = apply_header(
            &json!({}),
            &HeaderUpdate {
                id: Some("legacy".to_string()),
                ..HeaderUpdate::default()
            },
            &config,
        )
        .unwrap();
        assert_eq!(saved, json!({"id": "legacy"}));
    }

    #[test]
    fn bad_identifier_fails_without_changes() {
        let doc = json!({"$id": "keep"});
        let err = apply_header(
            &doc,
            &update("http://json-schema.org/draft-07/schema#", "1bad id"),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("table name"));
        assert_eq!(doc, json!({"$id": "keep"}));
    }

    #[test]
    fn unsupported_version_fails() {
        let err = apply_header(
            &json!({}),
            &update("https://json-schema.org/draft/2020-12/schema", "ok"),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::SchemaInvalid { .. }));
    }

    #[test]
    fn values_are_trimmed() {
        let saved = apply_header(
            &json!({}),
            &update(" http://json-schema.org/draft-07/schema# ", " run "),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(saved["$schema"], "http://json-schema.org/draft-07/schema#");
        assert_eq!(saved["$id"], "run");
        assert_eq!(saved["title"], "Run");
    }
}
