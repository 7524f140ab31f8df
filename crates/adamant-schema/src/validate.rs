//! # Schema and Instance Validation
//!
//! Two checks guard compile and export:
//!
//! - [`SchemaValidator::validate_document`] checks a canonical schema
//!   document's header: supported draft, a single identifier keyword that
//!   matches the draft, and an identifier that is a valid table name. It
//!   then checks the whole document against its draft's meta-schema with
//!   the `jsonschema` crate. The first failure is reported.
//! - [`SchemaValidator::validate_instance`] checks a data instance against
//!   the document's `properties`/`required` rules: presence, type, `enum`
//!   membership, and recursion into nested objects and arrays of objects.
//!   Every violation is collected so the editor can flag all bad fields in
//!   one pass.
//!
//! ## Violation paths
//!
//! Instance violations are tagged with schema-shaped dotted paths:
//! `Creator`, `Address.properties.City` for nested objects and
//! `Samples.items.Mass` for fields inside array elements. These are
//! translated onto the editable tree by [`crate::annotate`].

use std::fmt;

use adamant_core::{json_type_name, Draft, SchemaId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::synthesize::declared_type;

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Schema-shaped dotted path of the violating field. Empty for the root.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl Violation {
    /// Create a violation.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Record a violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Iterate over the violations in the order they were found.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl FromIterator<Violation> for ValidationViolations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ValidationViolations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Validates schema documents and the data instances filled against them.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    require_identifier: bool,
}

impl SchemaValidator {
    /// Create a validator governed by `config`.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            require_identifier: config.require_identifier,
        }
    }

    /// Check a canonical schema document. Returns its draft on success.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SchemaInvalid`] carrying the first failed
    /// check's message.
    pub fn validate_document(&self, document: &Value) -> Result<Draft, EngineError> {
        let Value::Object(header) = document else {
            return Err(EngineError::schema_invalid(format!(
                "Schema document must be a JSON object, found {}.",
                json_type_name(document)
            )));
        };

        let draft = match header.get("$schema") {
            None => {
                return Err(EngineError::schema_invalid(
                    "Schema version ($schema) is missing.",
                ))
            }
            Some(Value::String(uri)) => Draft::from_uri(uri).ok_or_else(|| {
                EngineError::schema_invalid(format!(
                    "Unsupported schema version '{uri}'. Supported versions are {} and {}.",
                    Draft::Draft04.uri(),
                    Draft::Draft07.uri()
                ))
            })?,
            Some(other) => {
                return Err(EngineError::schema_invalid(format!(
                    "Schema version ($schema) must be a string, found {}.",
                    json_type_name(other)
                )))
            }
        };

        if header.contains_key("id") && header.contains_key("$id") {
            return Err(EngineError::schema_invalid(
                "Schema declares both 'id' and '$id'. Only one identifier keyword is allowed.",
            ));
        }
        if header.contains_key(draft.foreign_id_keyword()) {
            return Err(EngineError::schema_invalid(format!(
                "Schema ID keyword '{}' does not match {}; use '{}'.",
                draft.foreign_id_keyword(),
                draft,
                draft.id_keyword()
            )));
        }

        match header.get(draft.id_keyword()) {
            Some(Value::String(candidate)) => {
                SchemaId::new(candidate.as_str())
                    .map_err(|e| EngineError::schema_invalid(e.to_string()))?;
            }
            Some(other) => {
                return Err(EngineError::schema_invalid(format!(
                    "Schema ID must be a string, found {}.",
                    json_type_name(other)
                )))
            }
            None if self.require_identifier => {
                return Err(EngineError::schema_invalid(
                    adamant_core::IdentifierError::Empty.to_string(),
                ))
            }
            None => {}
        }

        if let Some(properties) = header.get("properties") {
            let Value::Object(properties) = properties else {
                return Err(EngineError::schema_invalid(format!(
                    "'properties' must be an object mapping field names to schemas, found {}.",
                    json_type_name(properties)
                )));
            };
            if let Some((name, schema)) = properties.iter().find(|(_, schema)| !schema.is_object()) {
                return Err(EngineError::schema_invalid(format!(
                    "Property '{name}' must be a schema object, found {}.",
                    json_type_name(schema)
                )));
            }
        }

        let mut pinned = document.clone();
        if let Value::Object(map) = &mut pinned {
            map.insert("$schema".to_string(), Value::from(draft.uri()));
        }
        jsonschema::meta::validate(&pinned).map_err(|e| {
            EngineError::schema_invalid(format!(
                "Schema does not conform to the {draft} meta-schema: {e}"
            ))
        })?;

        tracing::debug!(draft = %draft, "schema document is valid");
        Ok(draft)
    }

    /// Check a data instance against a canonical schema document.
    ///
    /// The root of `instance` must be an object. `null` values count as
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InstanceInvalid`] listing every violation.
    pub fn validate_instance(&self, instance: &Value, schema: &Value) -> Result<(), EngineError> {
        let mut violations = ValidationViolations::default();
        match (instance, schema) {
            (Value::Object(data), Value::Object(schema)) => {
                check_object(schema, data, None, &mut violations);
            }
            (Value::Object(_), other) => violations.push(Violation::new(
                "",
                format!("schema must be an object, found {}", json_type_name(other)),
            )),
            (other, _) => violations.push(Violation::new(
                "",
                format!("data instance must be an object, found {}", json_type_name(other)),
            )),
        }

        if violations.is_empty() {
            tracing::debug!("data instance is valid");
            Ok(())
        } else {
            tracing::debug!(count = violations.len(), "data instance is invalid");
            Err(EngineError::InstanceInvalid { violations })
        }
    }

    /// Returns true if any `id` or `$id` anywhere in `document` equals
    /// `candidate`.
    ///
    /// Only schema nodes are searched. Keywords holding data (`default`,
    /// `enum`, `const`, `examples` and entered values) are skipped.
    pub fn check_id_exists(&self, document: &Value, candidate: &str) -> bool {
        id_exists(document, candidate, false)
    }
}

const DATA_KEYWORDS: [&str; 5] = ["default", "enum", "const", "examples", "value"];

/// `field_map` is set for the map under a `properties` keyword, whose keys
/// are field names rather than keywords.
fn id_exists(node: &Value, candidate: &str, field_map: bool) -> bool {
    match node {
        Value::Object(map) => map.iter().any(|(key, value)| {
            if field_map {
                return id_exists(value, candidate, false);
            }
            if (key == "id" || key == "$id") && value.as_str() == Some(candidate) {
                return true;
            }
            !DATA_KEYWORDS.contains(&key.as_str())
                && id_exists(value, candidate, key == "properties")
        }),
        Value::Array(items) => items.iter().any(|item| id_exists(item, candidate, false)),
        _ => false,
    }
}

fn join(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}.{name}"),
        None => name.to_string(),
    }
}

fn check_object(
    schema: &Map<String, Value>,
    data: &Map<String, Value>,
    prefix: Option<&str>,
    out: &mut ValidationViolations,
) {
    let present = |name: &str| data.get(name).is_some_and(|value| !value.is_null());

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !present(name) {
                out.push(Violation::new(join(prefix, name), format!("{name} is required")));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return;
    };
    for (name, property) in properties {
        let Some(value) = data.get(name).filter(|value| !value.is_null()) else {
            continue;
        };
        check_value(property, value, name, &join(prefix, name), out);
    }
}

fn check_value(schema: &Value, value: &Value, name: &str, path: &str, out: &mut ValidationViolations) {
    if let Some(expected) = type_mismatch(schema, value) {
        out.push(Violation::new(path, format!("{name} must be of type {expected}")));
        return;
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            let listed: Vec<String> = allowed.iter().map(render_enum_member).collect();
            out.push(Violation::new(
                path,
                format!("{name} must be one of: {}", listed.join(", ")),
            ));
        }
    }

    match value {
        Value::Object(nested) => {
            if let Some(schema) = schema.as_object() {
                let prefix = format!("{path}.properties");
                check_object(schema, nested, Some(&prefix), out);
            }
        }
        Value::Array(elements) => {
            let Some(items) = schema.get("items").filter(|items| items.is_object()) else {
                return;
            };
            let prefix = format!("{path}.items");
            for element in elements.iter().filter(|element| !element.is_null()) {
                match (element, items.as_object()) {
                    (Value::Object(element), Some(item_schema)) if describes_object(items) => {
                        check_object(item_schema, element, Some(&prefix), out);
                    }
                    _ => check_value(items, element, name, &prefix, out),
                }
            }
        }
        _ => {}
    }
}

pub(crate) fn describes_object(schema: &Value) -> bool {
    declared_type(schema) == Some("object") || schema.get("properties").is_some()
}

/// Returns the declared type text when `value` satisfies none of the
/// declared types.
fn type_mismatch(schema: &Value, value: &Value) -> Option<String> {
    let declared: Vec<&str> = match schema.get("type")? {
        Value::String(name) => vec![name.as_str()],
        Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
        _ => return None,
    };
    if declared.is_empty() || declared.iter().any(|name| type_matches(name, value)) {
        return None;
    }
    Some(declared.join(" or "))
}

fn type_matches(name: &str, value: &Value) -> bool {
    match name {
        "string" => value.is_string(),
        "number" => match value {
            Value::Number(_) => true,
            Value::String(text) => text.trim().parse::<f64>().is_ok_and(f64::is_finite),
            _ => false,
        },
        "integer" => match value {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            Value::String(text) => text.trim().parse::<i64>().is_ok(),
            _ => false,
        },
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn render_enum_member(member: &Value) -> String {
    match member {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
