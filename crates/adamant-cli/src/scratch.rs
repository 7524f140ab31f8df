//! # New — Start a schema from the metadata template.

use std::path::PathBuf;

use adamant_core::ExportKind;
use adamant_schema::{EditorSession, EngineConfig};
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use crate::write_artifact;

/// Arguments for `adamant new`.
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Output directory.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

/// Write the scratch template, dated `now`.
pub fn run_new(args: &NewArgs, config: &EngineConfig, now: DateTime<Utc>) -> Result<u8> {
    let session = EditorSession::from_scratch(config.clone(), now)?;
    let path = write_artifact(&args.out, ExportKind::Schema, &session.canonical()?)?;
    println!("{}", path.display());
    Ok(0)
}
