#![deny(missing_docs)]

//! # Generate Command
//!
//! Source manifests -> one `ApiDocument` per project -> both dialects on disk.

use apigraph_core::{
    export_all, AppResult, ExportFormat, GenerationRun, GeneratorConfig, SourceManifest,
};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// A manifest file, or a directory searched recursively for
    /// `*.yaml`, `*.yml` and `*.json` manifests.
    #[clap(long, short, env = "APIGRAPH_SOURCE", default_value = "manifests")]
    pub source: PathBuf,

    /// Generator configuration (YAML or JSON).
    #[clap(long, short, env = "APIGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output directory; each project gets its own subdirectory.
    #[clap(long, short, env = "APIGRAPH_OUT", default_value = "docs")]
    pub out: PathBuf,

    /// Output formats.
    #[clap(long, value_delimiter = ',', default_value = "json,yaml")]
    pub format: Vec<ExportFormat>,
}

/// Manifest files under `source`, in path order.
pub fn find_manifests(source: &Path) -> Vec<PathBuf> {
    if source.is_file() {
        return vec![source.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(source)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext, "yaml" | "yml" | "json"))
        })
        .collect();
    files.sort();
    files
}

/// Loads the configuration file, or the defaults.
pub fn load_config(path: Option<&Path>) -> AppResult<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::load(path),
        None => Ok(GeneratorConfig::default()),
    }
}

/// Executes the generation pipeline; returns the written files.
pub fn execute(args: &GenerateArgs) -> AppResult<Vec<PathBuf>> {
    let config = load_config(args.config.as_deref())?;
    let mut run = GenerationRun::new(config);

    let manifests = find_manifests(&args.source);
    if manifests.is_empty() {
        tracing::warn!(source = ?args.source, "no source manifests found");
    }
    for path in manifests {
        tracing::debug!(manifest = ?path, "loading");
        run.add_manifest(SourceManifest::load(&path)?)?;
    }

    let documents = run.run()?;
    let written = export_all(&args.out, &documents, &args.format);
    tracing::info!(
        projects = documents.len(),
        files = written.len(),
        out = ?args.out,
        "generation finished"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const MANIFEST: &str = r#"
classes:
  - name: PingController
    annotations: [{name: RestController}]
    methods:
      - name: ping
        return_type: String
        annotations: [{name: GetMapping, value: "/ping"}]
"#;

    #[test]
    fn test_find_manifests_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.yaml"), "").unwrap();
        fs::write(dir.path().join("nested/a.json"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = find_manifests(dir.path());
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.yaml", "a.json"]);
    }

    #[test]
    fn test_execute_writes_project_from_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("ping.yaml");
        fs::write(&source, MANIFEST).unwrap();
        let out = dir.path().join("out");

        let args = GenerateArgs {
            source,
            config: None,
            out: out.clone(),
            format: vec![ExportFormat::Json],
        };
        let written = execute(&args).unwrap();
        assert_eq!(written.len(), 2);
        assert!(out.join("ping/swagger.json").is_file());
        assert!(out.join("ping/openapi.json").is_file());
    }
}
