//! # adamant-cli — Command-Line Front End for the Schema Editor Engine
//!
//! Provides the `adamant` binary, which drives the engine over files on
//! disk instead of an interactive editor.
//!
//! ## Subcommands
//!
//! - `adamant inspect` — Print the editable representation of a schema.
//! - `adamant blueprint` — Print the initial data instance of a schema.
//! - `adamant compile` — Check a schema document.
//! - `adamant export` — Validate a data file and write it under its
//!   content-addressed name.
//! - `adamant header` — Rewrite a schema's header.
//! - `adamant new` — Write the scratch metadata template.
//!
//! ```bash
//! adamant compile run.schema.json
//! adamant export run.schema.json run.data.json --name run.json --out dist/
//! adamant header run.schema.json --draft http://json-schema.org/draft-04/schema# --id run
//! ```
//!
//! Every path argument naming an input document accepts `-` for stdin.

pub mod compile;
pub mod export;
pub mod header;
pub mod inspect;
pub mod scratch;

use std::path::{Path, PathBuf};

use adamant_core::{export_file_name, ExportKind};
use adamant_schema::EngineConfig;
use anyhow::{Context, Result};
use serde_json::Value;

/// Load the engine configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Read the raw text of an input document. `-` reads standard input.
pub fn read_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return std::io::read_to_string(std::io::stdin()).context("failed to read stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Read and parse a JSON input document.
pub fn read_json(path: &Path) -> Result<Value> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Write `value` as pretty JSON into `dir` under its content-addressed
/// name. Returns the written path.
pub fn write_artifact(dir: &Path, kind: ExportKind, value: &Value) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    let path = dir.join(export_file_name(kind, value));
    let mut text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    text.push('\n');
    std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "artifact written");
    Ok(path)
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
