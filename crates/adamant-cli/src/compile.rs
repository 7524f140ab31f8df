//! # Compile — Check a schema document.
//!
//! Prints `VALID` with the detected draft, or the reason the document was
//! rejected. Exit code 1 on rejection.

use std::path::PathBuf;

use adamant_schema::{EditorSession, EngineConfig, EngineError};
use anyhow::Result;
use clap::Args;

use crate::read_text;

/// Arguments for `adamant compile`.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Schema document (`-` for stdin).
    pub schema: PathBuf,
}

/// Execute the compile subcommand.
pub fn run_compile(args: &CompileArgs, config: &EngineConfig) -> Result<u8> {
    let raw = read_text(&args.schema)?;
    let outcome = EditorSession::load_schema(&raw, config.clone()).and_then(|s| s.compile());
    match outcome {
        Ok(draft) => {
            println!("VALID ({draft})");
            Ok(0)
        }
        Err(e @ (EngineError::SchemaInvalid { .. } | EngineError::Parse(_))) => {
            println!("INVALID: {e}");
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}
