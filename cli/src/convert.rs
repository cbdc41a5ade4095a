#![deny(missing_docs)]

//! # Convert Command
//!
//! Projects an existing source dialect document onto the target dialect.

use apigraph_core::{to_openapi, ApiDocument, AppResult, ExportFormat};
use std::path::PathBuf;

/// Arguments for the convert command.
#[derive(clap::Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Source dialect document (JSON or YAML).
    #[clap(long, short, default_value = "swagger.json")]
    pub input: PathBuf,

    /// Output file; defaults to `openapi.<ext>` beside the input.
    #[clap(long, short)]
    pub output: Option<PathBuf>,

    /// Output format.
    #[clap(long, default_value = "json")]
    pub format: ExportFormat,
}

/// Executes the conversion; returns the written file.
pub fn execute(args: &ConvertArgs) -> AppResult<PathBuf> {
    let content = std::fs::read_to_string(&args.input)?;
    let document: ApiDocument = serde_yaml::from_str(&content)?;
    let rendered = args.format.render(&to_openapi(&document)?)?;

    let output = args.output.clone().unwrap_or_else(|| {
        args.input
            .with_file_name(format!("openapi.{}", args.format.extension()))
    });
    std::fs::write(&output, rendered)?;
    tracing::info!(input = ?args.input, output = ?output, "converted");
    Ok(output)
}
