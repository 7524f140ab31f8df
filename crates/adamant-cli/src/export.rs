//! # Export — Validate a data file and store it by content address.
//!
//! ```bash
//! adamant export run.schema.json run.data.json --name run.json --out dist/
//! ```
//!
//! The data is pruned and validated against the schema. Violations are
//! listed and the command exits 1. Otherwise the pruned instance is
//! written as `formdata-<sha256>.json`.

use std::path::PathBuf;

use adamant_core::ExportKind;
use adamant_schema::{prepare_export, stamp_schema_id, EngineConfig, EngineError, SchemaValidator};
use anyhow::{bail, Result};
use clap::Args;

use crate::{read_json, write_artifact};

/// Arguments for `adamant export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Schema document (`-` for stdin).
    pub schema: PathBuf,

    /// Data instance to validate.
    pub data: PathBuf,

    /// Output directory.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Schema file name recorded in the exported data as `SchemaID`.
    #[arg(long)]
    pub name: Option<String>,
}

/// Execute the export subcommand.
pub fn run_export(args: &ExportArgs, config: &EngineConfig) -> Result<u8> {
    let schema = read_json(&args.schema)?;
    if !schema.is_object() {
        bail!("{} is not a schema document", args.schema.display());
    }
    let data = read_json(&args.data)?;

    let validator = SchemaValidator::new(config);
    let pruned = match prepare_export(&validator, &schema, &data) {
        Ok(pruned) => pruned,
        Err(EngineError::InstanceInvalid { violations }) => {
            println!("INVALID ({} violations)", violations.len());
            println!("{violations}");
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    let exported = match (&args.name, config.stamp_schema_id) {
        (Some(name), true) => stamp_schema_id(&pruned, name),
        _ => pruned,
    };
    let path = write_artifact(&args.out, ExportKind::FormData, &exported)?;
    println!("{}", path.display());
    Ok(0)
}
