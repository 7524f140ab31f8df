//! Integration tests: full editing sessions against the public API.

use adamant_schema::{
    export_file_name, EditorSession, EngineConfig, EngineError, ExportKind, HeaderUpdate,
    ValueKind,
};
use adamant_core::Draft;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

fn person_schema() -> &'static str {
    r#"{
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "Name": {"type": "string"},
            "Age": {"type": "integer"}
        },
        "required": ["Name"]
    }"#
}

#[test]
fn edit_then_export_reports_missing_required_field() {
    let mut session = EditorSession::load_schema(person_schema(), EngineConfig::default()).unwrap();
    assert_eq!(session.instance(), &json!({}));

    let (_, instance) = session
        .on_field_edit("properties.1.value", json!("30"), ValueKind::Integer)
        .unwrap();
    assert_eq!(instance, &json!({"Age": 30}));

    let err = session.export_data_instance().unwrap_err();
    let EngineError::InstanceInvalid { violations } = err else {
        panic!("expected InstanceInvalid, got {err:?}");
    };
    assert_eq!(violations.len(), 1);
    assert_eq!(violations.violations()[0].path, "Name");

    let name_entry = &session.editable()["properties"][0];
    assert_eq!(name_entry["adamant_field_error"], true);
    assert_eq!(name_entry["adamant_error_description"], "Name is required");
}

#[test]
fn header_switch_to_draft04_compiles() {
    let raw = r#"{
        "$schema": "http://json-schema.org/draft-07/schema#",
        "$id": "run",
        "type": "object",
        "properties": {
            "Sample": {"$id": "sample", "type": "object", "properties": {"Mass": {"type": "number"}}}
        }
    }"#;
    let mut session = EditorSession::load_schema(raw, EngineConfig::default()).unwrap();
    assert_eq!(session.compile().unwrap(), Draft::Draft07);

    session
        .on_header_save(&HeaderUpdate {
            schema_version: Some(Draft::Draft04.uri().to_string()),
            id: Some("run".to_string()),
            title: Some("Run".to_string()),
            description: None,
        })
        .unwrap();

    let canonical = session.canonical().unwrap();
    assert_eq!(canonical["id"], "run");
    assert!(canonical.get("$id").is_none());
    assert_eq!(canonical["properties"]["Sample"]["id"], "sample");
    let keys: Vec<&String> = canonical.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["$schema", "id", "title", "type", "properties"]);
    assert_eq!(session.compile().unwrap(), Draft::Draft04);
}

#[test]
fn failed_header_save_keeps_document() {
    let mut session = EditorSession::load_schema(person_schema(), EngineConfig::default()).unwrap();
    let before = session.editable().clone();
    let err = session
        .on_header_save(&HeaderUpdate {
            id: Some("has space".to_string()),
            ..HeaderUpdate::default()
        })
        .unwrap_err();
    assert!(matches!(err, EngineError::SchemaInvalid { .. }));
    assert_eq!(session.editable(), &before);
}

#[test]
fn compile_without_identifier_fails() {
    let session = EditorSession::load_schema(person_schema(), EngineConfig::default()).unwrap();
    assert!(matches!(session.compile(), Err(EngineError::SchemaInvalid { .. })));

    let lenient = EngineConfig {
        require_identifier: false,
        ..EngineConfig::default()
    };
    let session = EditorSession::load_schema(person_schema(), lenient).unwrap();
    assert_eq!(session.compile().unwrap(), Draft::Draft07);
}

#[test]
fn scratch_session_flags_creator_then_exports() {
    let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let mut session = EditorSession::from_scratch(EngineConfig::default(), now)
        .unwrap()
        .with_schema_name("metadata.json");

    let err = session.export_data_instance().unwrap_err();
    let EngineError::InstanceInvalid { violations } = err else {
        panic!("expected InstanceInvalid, got {err:?}");
    };
    let paths: Vec<&str> = violations.iter().map(|v| v.path.as_str()).collect();
    assert_eq!(paths, ["Identifier", "Creator", "ORCID", "Project"]);

    let creator = &session.editable()["properties"][2];
    assert_eq!(creator["fieldKey"], "Creator");
    assert_eq!(creator["adamant_field_error"], true);

    for (index, text) in [(1, "ds-1"), (2, "Ada"), (3, "0000-0001"), (5, "12:00:00"), (6, "Engine")] {
        session
            .on_field_edit(&format!("properties.{index}.value"), json!(text), ValueKind::String)
            .unwrap();
    }
    let exported = session.export_data_instance().unwrap();
    assert_eq!(exported["Creator"], "Ada");
    assert_eq!(exported["Date"], "2025-01-02");
    assert_eq!(exported["Time"], "12:00:00");
    assert_eq!(exported["SchemaID"], "metadata");
    assert!(session.editable()["properties"][2].get("adamant_field_error").is_none());

    let file_name = export_file_name(ExportKind::FormData, &exported);
    assert!(file_name.starts_with("formdata-"));
    assert!(file_name.ends_with(".json"));
}

#[test]
fn array_of_objects_element_error_flags_array_field() {
    let raw = r#"{
        "$schema": "http://json-schema.org/draft-07/schema#",
        "properties": {
            "Samples": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {"Mass": {"type": "number"}},
                    "required": ["Mass"]
                }
            }
        }
    }"#;
    let mut session = EditorSession::load_schema(raw, EngineConfig::default()).unwrap();
    session
        .on_field_edit("properties.0.value", json!([{"Mass": "heavy"}]), ValueKind::Array)
        .unwrap();

    assert!(session.export_data_instance().is_err());
    let samples = &session.editable()["properties"][0];
    assert_eq!(samples["adamant_field_error"], true);
    assert_eq!(
        samples["adamant_error_description"],
        session.config().array_error_message.as_str()
    );
}

#[test]
fn rename_and_delete_keep_schema_and_data_in_step() {
    let mut session = EditorSession::load_schema(person_schema(), EngineConfig::default()).unwrap();
    session
        .on_field_edit("properties.0.value", json!("Ada"), ValueKind::String)
        .unwrap();
    session.on_field_rename("Name", "FullName").unwrap();

    let canonical = session.canonical().unwrap();
    assert!(canonical["properties"].get("FullName").is_some());
    assert_eq!(canonical["required"], json!(["FullName"]));
    assert_eq!(session.instance(), &json!({"FullName": "Ada"}));

    session.on_field_delete("FullName").unwrap();
    assert_eq!(session.instance(), &json!({}));

    session.on_schema_field_delete("properties.1").unwrap();
    let canonical: Value = session.canonical().unwrap();
    assert!(canonical["properties"].get("Age").is_none());

    session.revert();
    assert_eq!(session.canonical().unwrap(), *session.loaded());
}

#[test]
fn scalar_array_element_error_keeps_its_message() {
    let raw = r#"{
        "$schema": "http://json-schema.org/draft-07/schema#",
        "properties": {"Tags": {"type": "array", "items": {"type": "string"}}}
    }"#;
    let mut session = EditorSession::load_schema(raw, EngineConfig::default()).unwrap();
    session
        .on_field_edit("properties.0.value", json!(["ok", 7]), ValueKind::Array)
        .unwrap();

    assert!(session.export_data_instance().is_err());
    let tags = &session.editable()["properties"][0];
    assert_eq!(tags["adamant_field_error"], true);
    assert_eq!(tags["adamant_error_description"], "Tags must be of type string");
}

#[test]
fn clearing_a_group_removes_it_from_the_instance() {
    let raw = r#"{
        "$schema": "http://json-schema.org/draft-07/schema#",
        "$id": "site",
        "properties": {
            "Name": {"type": "string"},
            "Address": {"type": "object", "properties": {"City": {"type": "string"}}}
        }
    }"#;
    let mut session = EditorSession::load_schema(raw, EngineConfig::default()).unwrap();
    session
        .on_field_edit("properties.0.value", json!("Lab"), ValueKind::String)
        .unwrap();
    session
        .on_field_edit("properties.1.properties.0.value", json!("Kiel"), ValueKind::String)
        .unwrap();

    session.on_field_delete("Address.City").unwrap();
    assert_eq!(session.instance(), &json!({"Name": "Lab"}));
    assert!(session.canonical().unwrap()["properties"]["Address"].get("value").is_none());
    assert_eq!(session.export_data_instance().unwrap(), json!({"Name": "Lab"}));
}

#[test]
fn identifier_lookup_and_loose_schema_version() {
    let raw = r#"{
        "$schema": " http://json-schema.org/draft-07/schema ",
        "$id": "catalog",
        "properties": {"Items": {"type": "array", "default": [{"id": "seeded"}]}}
    }"#;
    let mut session = EditorSession::load_schema(raw, EngineConfig::default()).unwrap();
    assert_eq!(session.compile().unwrap(), Draft::Draft07);

    session
        .on_field_edit("properties.0.value", json!([{"$id": "typed"}]), ValueKind::Array)
        .unwrap();
    assert!(session.check_id_exists("catalog"));
    assert!(!session.check_id_exists("seeded"));
    assert!(!session.check_id_exists("typed"));
}
