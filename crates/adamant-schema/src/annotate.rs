//! # Violation Annotation
//!
//! Validator paths are schema-shaped (`Address.properties.City`), but the
//! editor addresses fields by position (`properties.0.properties.2`). This
//! module translates one into the other and writes the violation onto the
//! matching entry as two editor-only keys:
//!
//! - `adamant_field_error: true`
//! - `adamant_error_description: <message>`
//!
//! A violation inside an array element flags the whole array field.
//! Elements are not entries of their own. For arrays of objects the flag
//! carries the configured array error message; for arrays of scalars the
//! violation's own message is kept.

use adamant_core::{path, FieldPath};
use serde_json::{Map, Value};

use crate::config::EngineConfig;
use crate::convert::{ERROR_DESCRIPTION, FIELD_ERROR, FIELD_KEY};
use crate::validate::{describes_object, ValidationViolations};

/// Where a violation lands in the editable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationTarget {
    /// Path of the flagged entry.
    pub path: FieldPath,
    /// True when the entry is an array of objects flagged for a field of
    /// one of its elements.
    pub array_field: bool,
}

/// Translate a validator path into the path of an entry in `editable`.
///
/// Translation stops at the first `items` segment: the array field itself
/// is the target. Returns `None` if any named field has no entry or the
/// path has any other shape.
pub fn editable_path(editable: &Value, violation_path: &str) -> Option<AnnotationTarget> {
    let mut segments = violation_path.split('.');
    let mut target = FieldPath::root();

    let first = segments.next().filter(|name| !name.is_empty())?;
    let mut node = enter_entry(editable, first, &mut target)?;

    while let Some(segment) = segments.next() {
        match segment {
            "properties" => {
                let name = segments.next()?;
                node = enter_entry(node, name, &mut target)?;
            }
            "items" => {
                let items = node.get("items").filter(|items| items.is_object())?;
                return Some(AnnotationTarget {
                    path: target,
                    array_field: describes_object(items),
                });
            }
            _ => return None,
        }
    }
    Some(AnnotationTarget {
        path: target,
        array_field: false,
    })
}

fn enter_entry<'a>(node: &'a Value, name: &str, target: &mut FieldPath) -> Option<&'a Value> {
    let entries = node.get("properties")?.as_array()?;
    let index = entries
        .iter()
        .position(|entry| entry.get(FIELD_KEY).and_then(Value::as_str) == Some(name))?;
    target.push("properties");
    target.push(index);
    entries.get(index)
}

/// Return a copy of `editable` with previous annotations cleared and every
/// resolvable violation written onto its entry.
///
/// When several violations land on the same entry, the first one's message
/// is kept.
pub fn annotate_violations(
    editable: &Value,
    violations: &ValidationViolations,
    config: &EngineConfig,
) -> Value {
    let mut annotated = clear_annotations(editable);
    for violation in violations {
        let Some(target) = editable_path(&annotated, &violation.path) else {
            tracing::warn!(path = %violation.path, "violation does not resolve to an editable field");
            continue;
        };
        let flag = target.path.child(FIELD_ERROR);
        if path::get(&annotated, &flag) == Some(&Value::Bool(true)) {
            continue;
        }
        let message = if target.array_field {
            config.array_error_message.as_str()
        } else {
            violation.message.as_str()
        };
        let written = path::set(&annotated, &flag, Value::Bool(true)).and_then(|tree| {
            path::set(&tree, &target.path.child(ERROR_DESCRIPTION), Value::from(message))
        });
        match written {
            Ok(tree) => annotated = tree,
            Err(e) => tracing::warn!(path = %target.path, error = %e, "cannot annotate field"),
        }
    }
    annotated
}

/// Return a copy of `tree` with both annotation keys removed at every depth.
pub fn clear_annotations(tree: &Value) -> Value {
    match tree {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != FIELD_ERROR && key.as_str() != ERROR_DESCRIPTION)
                .map(|(key, value)| (key.clone(), clear_annotations(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(clear_annotations).collect()),
        other => other.clone(),
    }
}
