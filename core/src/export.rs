//! # Export
//!
//! Writes each project's document in both dialects to
//! `<out>/<project>/{swagger,openapi}.{json,yml}`.

use crate::convert::to_openapi;
use crate::document::model::ApiDocument;
use crate::error::{AppError, AppResult};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// `swagger.json` and `openapi.json`.
    Json,
    /// `swagger.yml` and `openapi.yml`.
    Yaml,
}

impl ExportFormat {
    /// File extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yml",
        }
    }

    /// Media subtype used when publishing (`application/<subtype>`).
    pub fn media_subtype(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }

    /// Serializes any document value.
    pub fn render<T: Serialize>(&self, value: &T) -> AppResult<String> {
        match self {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            ExportFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_subtype())
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            other => Err(AppError::General(format!("Unknown export format '{}'", other))),
        }
    }
}

/// Writes one project in one format; returns the written files.
///
/// The Swagger 2 file is written first. A failed conversion or write of the
/// OpenAPI 3 file is logged on its own and leaves the Swagger 2 file in place.
pub fn export_project(
    out_dir: &Path,
    project: &str,
    document: &ApiDocument,
    format: ExportFormat,
) -> AppResult<Vec<PathBuf>> {
    write_dialects(out_dir, project, document, format, to_openapi)
}

fn write_dialects<C>(
    out_dir: &Path,
    project: &str,
    document: &ApiDocument,
    format: ExportFormat,
    convert: C,
) -> AppResult<Vec<PathBuf>>
where
    C: FnOnce(&ApiDocument) -> AppResult<JsonValue>,
{
    let dir = out_dir.join(project);
    std::fs::create_dir_all(&dir)?;

    let swagger = dir.join(format!("swagger.{}", format.extension()));
    std::fs::write(&swagger, format.render(document)?)?;

    let openapi = dir.join(format!("openapi.{}", format.extension()));
    let converted = convert(document)
        .and_then(|value| format.render(&value))
        .and_then(|text| std::fs::write(&openapi, text).map_err(AppError::from));
    match converted {
        Ok(()) => Ok(vec![swagger, openapi]),
        Err(e) => {
            tracing::error!(project = %project, %format, error = %e, "openapi export failed");
            Ok(vec![swagger])
        }
    }
}

/// Writes every project in every format. A failing format is logged and the
/// remaining ones still run; the written files are returned.
pub fn export_all<'a, I>(out_dir: &Path, documents: I, formats: &[ExportFormat]) -> Vec<PathBuf>
where
    I: IntoIterator<Item = (&'a String, &'a ApiDocument)>,
{
    let mut written = Vec::new();
    for (project, document) in documents {
        for format in formats {
            match export_project(out_dir, project, document, *format) {
                Ok(files) => {
                    tracing::info!(project = %project, %format, "exported");
                    written.extend(files);
                }
                Err(e) => {
                    tracing::error!(project = %project, %format, error = %e, "export failed")
                }
            }
        }
    }
    written
}
