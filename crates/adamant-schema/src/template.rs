//! Starting document for a schema created from scratch.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use adamant_core::Draft;

/// Crawler marker stored in every metadata file built from the template.
pub const FILE_TYPE_MARKER: &str =
    "This is a EMPI-RF metadata File. Do not change this for crawler identification";

/// Build the scratch schema: a draft-07 document with the common metadata
/// fields, all required. `Date` and `Time` default to the UTC date
/// (`YYYY-MM-DD`) and time (`HH:MM:SS`) of `now`.
pub fn scratch_document(now: DateTime<Utc>) -> Value {
    let date = now.format("%Y-%m-%d").to_string();
    let time = now.format("%H:%M:%S").to_string();
    json!({
        "$schema": Draft::Draft07.uri(),
        "type": "object",
        "properties": {
            "FileTypeIdentifier": {
                "title": "FileTypeIdentifier",
                "description": "to allow crawlers to identify our JSON files",
                "type": "string",
                "default": FILE_TYPE_MARKER,
                "enum": [FILE_TYPE_MARKER]
            },
            "Identifier": {
                "title": "Identifier",
                "description": "Unique identifier for the dataset",
                "type": "string"
            },
            "Creator": {
                "title": "Creator",
                "description": "The name of the primary researcher",
                "type": "string"
            },
            "ORCID": {
                "title": "ORCID",
                "description": "ID of the primary researcher",
                "type": "string"
            },
            "Date": {
                "title": "Date",
                "description": "The date when the experiment started in ISO 8601",
                "type": "string",
                "default": date
            },
            "Time": {
                "title": "Time",
                "description": "The time when the experiment started in ISO 8601-1:2019",
                "type": "string",
                "default": time
            },
            "Project": {
                "title": "Project",
                "description": "Name of the related project",
                "type": "string"
            }
        },
        "required": [
            "FileTypeIdentifier",
            "Identifier",
            "Creator",
            "ORCID",
            "Date",
            "Time",
            "Project"
        ]
    })
}
