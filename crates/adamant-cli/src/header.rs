//! # Header — Rewrite the header of a schema document.
//!
//! ```bash
//! adamant header run.schema.json --draft http://json-schema.org/draft-04/schema# --id run
//! ```
//!
//! Omitted flags remove the corresponding key, as an emptied field does in
//! the editor. The result is written as `jsonschema-<sha256>.json`.

use std::path::PathBuf;

use adamant_core::ExportKind;
use adamant_schema::{EditorSession, EngineConfig, HeaderUpdate};
use anyhow::{Context, Result};
use clap::Args;

use crate::{read_text, write_artifact};

/// Arguments for `adamant header`.
#[derive(Args, Debug)]
pub struct HeaderArgs {
    /// Schema document (`-` for stdin).
    pub schema: PathBuf,

    /// Draft URI for `$schema`.
    #[arg(long)]
    pub draft: Option<String>,

    /// Schema identifier.
    #[arg(long)]
    pub id: Option<String>,

    /// Schema title.
    #[arg(long)]
    pub title: Option<String>,

    /// Schema description.
    #[arg(long)]
    pub description: Option<String>,

    /// Output directory.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

impl HeaderArgs {
    fn update(&self) -> HeaderUpdate {
        HeaderUpdate {
            schema_version: self.draft.clone(),
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

/// Execute the header subcommand.
pub fn run_header(args: &HeaderArgs, config: &EngineConfig) -> Result<u8> {
    let raw = read_text(&args.schema)?;
    let mut session = EditorSession::load_schema(&raw, config.clone())
        .with_context(|| format!("cannot open schema {}", args.schema.display()))?;
    session
        .on_header_save(&args.update())
        .context("header rejected")?;
    let document = session.canonical()?;
    let path = write_artifact(&args.out, ExportKind::Schema, &document)?;
    println!("{}", path.display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_json;

    fn args(dir: &tempfile::TempDir, id: &str) -> HeaderArgs {
        let schema = dir.path().join("run.json");
        std::fs::write(
            &schema,
            r#"{"$schema": "http://json-schema.org/draft-07/schema#", "$id": "run",
                "properties": {"Sample": {"$id": "sample", "type": "object"}}}"#,
        )
        .unwrap();
        HeaderArgs {
            schema,
            draft: Some("http://json-schema.org/draft-04/schema#".to_string()),
            id: Some(id.to_string()),
            title: Some("Run".to_string()),
            description: None,
            out: dir.path().join("out"),
        }
    }

    #[test]
    fn header_is_rewritten_and_stored() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(&dir, "run_v2");
        assert_eq!(run_header(&args, &EngineConfig::default()).unwrap(), 0);

        let written: Vec<_> = std::fs::read_dir(&args.out).unwrap().flatten().collect();
        assert_eq!(written.len(), 1);
        let name = written[0].file_name().to_string_lossy().into_owned();
        assert!(name.starts_with("jsonschema-"));

        let document = read_json(&written[0].path()).unwrap();
        assert_eq!(document["id"], "run_v2");
        assert_eq!(document["title"], "Run");
        assert_eq!(document["properties"]["Sample"]["id"], "sample");
        assert!(document.get("$id").is_none());
    }

    #[test]
    fn bad_identifier_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(&dir, "not valid");
        assert!(run_header(&args, &EngineConfig::default()).is_err());
        assert!(!args.out.exists());
    }
}
