//! # Keyword Normalization Across Drafts
//!
//! JSON Schema draft-04 names the identifier keyword `id`; later drafts name
//! it `$id`. When the active draft of a document changes, every identifier
//! nested in its `properties` has to follow. [`rename_keyword`] performs the
//! rename anywhere in a tree while keeping each renamed key at the position
//! it occupied among its siblings.
//!
//! The draft policy itself lives in [`normalize_identifiers`]. It is meant
//! to run over the editable entry list, where field names are stored as
//! `fieldKey` values rather than object keys, so a field that happens to be
//! called `id` is never renamed.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Draft-04 meta-schema URI.
pub const DRAFT_04_URI: &str = "http://json-schema.org/draft-04/schema#";

/// Draft-07 meta-schema URI.
pub const DRAFT_07_URI: &str = "http://json-schema.org/draft-07/schema#";

/// A supported JSON Schema draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Draft {
    /// Draft-04, identifier keyword `id`.
    #[serde(rename = "http://json-schema.org/draft-04/schema#")]
    Draft04,
    /// Draft-07, identifier keyword `$id`.
    #[default]
    #[serde(rename = "http://json-schema.org/draft-07/schema#")]
    Draft07,
}

impl Draft {
    /// All supported drafts, oldest first.
    pub const ALL: [Draft; 2] = [Draft::Draft04, Draft::Draft07];

    /// The canonical meta-schema URI of this draft.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Draft04 => DRAFT_04_URI,
            Self::Draft07 => DRAFT_07_URI,
        }
    }

    /// Recognize a `$schema` value.
    ///
    /// Surrounding whitespace and a missing trailing `#` are tolerated.
    pub fn from_uri(uri: &str) -> Option<Self> {
        let trimmed = uri.trim();
        let bare = trimmed.strip_suffix('#').unwrap_or(trimmed);
        Self::ALL
            .into_iter()
            .find(|draft| draft.uri().strip_suffix('#') == Some(bare))
    }

    /// The keyword this draft uses for schema identifiers.
    pub fn id_keyword(&self) -> &'static str {
        match self {
            Self::Draft04 => "id",
            Self::Draft07 => "$id",
        }
    }

    /// The identifier keyword of the other naming convention.
    pub fn foreign_id_keyword(&self) -> &'static str {
        match self {
            Self::Draft04 => "$id",
            Self::Draft07 => "id",
        }
    }

    /// Short human-readable name, e.g. `draft-04`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Draft04 => "draft-04",
            Self::Draft07 => "draft-07",
        }
    }
}

impl fmt::Display for Draft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Return a copy of `tree` with every object key equal to `old` renamed to
/// `new`, at every depth.
///
/// The renamed key keeps its position among its siblings. If an object
/// already holds `new` next to `old`, the renamed value wins and the
/// pre-existing `new` entry is dropped. Scalars and `null` pass through.
pub fn rename_keyword(tree: &Value, old: &str, new: &str) -> Value {
    match tree {
        Value::Object(map) => Value::Object(rename_in_object(map, old, new)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| rename_keyword(item, old, new))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

fn rename_in_object(map: &Map<String, Value>, old: &str, new: &str) -> Map<String, Value> {
    let renaming = old != new && map.contains_key(old);
    let mut rebuilt = Map::with_capacity(map.len());
    for (key, value) in map {
        let value = rename_keyword(value, old, new);
        if !renaming {
            rebuilt.insert(key.clone(), value);
        } else if key == old {
            rebuilt.insert(new.to_string(), value);
        } else if key != new {
            rebuilt.insert(key.clone(), value);
        }
    }
    rebuilt
}

/// Apply the identifier policy of `draft` to a `properties` subtree.
///
/// Draft-04 turns every `$id` into `id`; any other draft turns every `id`
/// into `$id`.
pub fn normalize_identifiers(properties: &Value, draft: Draft) -> Value {
    let normalized = rename_keyword(properties, draft.foreign_id_keyword(), draft.id_keyword());
    tracing::debug!(draft = %draft, "normalized nested identifiers");
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(value: &Value) -> Vec<String> {
        value.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn rename_keeps_relative_position() {
        let tree = json!({"title": "T", "id": "x", "type": "string"});
        let renamed = rename_keyword(&tree, "id", "$id");
        assert_eq!(keys(&renamed), ["title", "$id", "type"]);
        assert_eq!(renamed["$id"], "x");
    }

    #[test]
    fn rename_recurses_through_objects_and_arrays() {
        let tree = json!([
            {"fieldKey": "a", "id": "one", "properties": [{"fieldKey": "b", "id": "two"}]},
            {"fieldKey": "c", "items": {"id": "three"}},
            null,
            3
        ]);
        let renamed = rename_keyword(&tree, "id", "$id");
        assert_eq!(renamed[0]["$id"], "one");
        assert_eq!(renamed[0]["properties"][0]["$id"], "two");
        assert_eq!(renamed[1]["items"]["$id"], "three");
        assert_eq!(renamed[2], Value::Null);
        assert_eq!(renamed[3], json!(3));
        assert!(!renamed.to_string().contains("\"id\""));
    }

    #[test]
    fn rename_is_idempotent() {
        let tree = json!({"a": {"id": "x", "b": [{"id": "y"}]}});
        let once = rename_keyword(&tree, "id", "$id");
        let twice = rename_keyword(&once, "id", "$id");
        assert_eq!(once, twice);
    }

    #[test]
    fn rename_handles_leaves() {
        assert_eq!(rename_keyword(&Value::Null, "id", "$id"), Value::Null);
        assert_eq!(rename_keyword(&json!("id"), "id", "$id"), json!("id"));
    }

    #[test]
    fn rename_collision_prefers_renamed_value() {
        let tree = json!({"$id": "stale", "title": "T", "id": "fresh"});
        let renamed = rename_keyword(&tree, "id", "$id");
        assert_eq!(renamed, json!({"title": "T", "$id": "fresh"}));
        assert_eq!(keys(&renamed), ["title", "$id"]);
    }

    #[test]
    fn draft_switch_restores_placement() {
        let properties = json!([
            {"fieldKey": "Sample", "$id": "sample", "type": "object",
             "properties": [{"fieldKey": "Mass", "$id": "mass", "type": "number"}]}
        ]);
        let draft04 = normalize_identifiers(&properties, Draft::Draft04);
        assert_eq!(draft04[0]["id"], "sample");
        assert_eq!(draft04[0]["properties"][0]["id"], "mass");
        let back = normalize_identifiers(&draft04, Draft::Draft07);
        assert_eq!(back, properties);
    }

    #[test]
    fn draft_from_uri_is_lenient() {
        assert_eq!(Draft::from_uri(DRAFT_04_URI), Some(Draft::Draft04));
        assert_eq!(
            Draft::from_uri(" http://json-schema.org/draft-07/schema "),
            Some(Draft::Draft07)
        );
        assert_eq!(
            Draft::from_uri("https://json-schema.org/draft/2020-12/schema"),
            None
        );
    }

    #[test]
    fn draft_serde_uses_uri() {
        let encoded = serde_json::to_value(Draft::Draft04).unwrap();
        assert_eq!(encoded, json!(DRAFT_04_URI));
        let decoded: Draft = serde_json::from_value(json!(DRAFT_07_URI)).unwrap();
        assert_eq!(decoded, Draft::Draft07);
    }
}
