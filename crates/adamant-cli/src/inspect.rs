//! # Inspect — Show a schema the way the editor sees it.
//!
//! ```bash
//! adamant inspect run.schema.json
//! adamant inspect run.schema.json --any-of
//! adamant blueprint run.schema.json
//! ```

use std::path::{Path, PathBuf};

use adamant_schema::{EditorSession, EngineConfig};
use anyhow::{Context, Result};
use clap::Args;

use crate::{print_json, read_text};

/// Arguments for `adamant inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Schema document (`-` for stdin).
    pub schema: PathBuf,

    /// Flatten `anyOf` alternatives into one entry per branch.
    #[arg(long)]
    pub any_of: bool,
}

/// Arguments for `adamant blueprint`.
#[derive(Args, Debug)]
pub struct BlueprintArgs {
    /// Schema document (`-` for stdin).
    pub schema: PathBuf,
}

fn open(schema: &Path, config: &EngineConfig) -> Result<EditorSession> {
    let raw = read_text(schema)?;
    EditorSession::load_schema(&raw, config.clone())
        .with_context(|| format!("cannot open schema {}", schema.display()))
}

/// Print the editable document, or its `anyOf` projection.
pub fn run_inspect(args: &InspectArgs, config: &EngineConfig) -> Result<u8> {
    let session = open(&args.schema, config)?;
    if args.any_of {
        print_json(&session.any_of_projection()?)?;
    } else {
        print_json(session.editable())?;
    }
    Ok(0)
}

/// Print the data instance a fresh session starts with.
pub fn run_blueprint(args: &BlueprintArgs, config: &EngineConfig) -> Result<u8> {
    let session = open(&args.schema, config)?;
    print_json(session.instance())?;
    Ok(0)
}
