//! # Generation Run
//!
//! Drives one run over any number of projects: per project a fresh type
//! table, resolver context and assembler, every classifier over every class,
//! and a finalized `ApiDocument` when at least one path was found.

use crate::classify::{default_classifiers, ClassifyContext, RouteClassifier};
use crate::config::GeneratorConfig;
use crate::document::assembler::DocumentAssembler;
use crate::document::model::ApiDocument;
use crate::error::{AppError, AppResult};
use crate::frontend::{SourceManifest, TypeTable};
use crate::schema::{ResolverContext, TypeResolver};
use std::collections::BTreeMap;

/// One generation run.
pub struct GenerationRun {
    config: GeneratorConfig,
    classifiers: Vec<Box<dyn RouteClassifier>>,
    projects: BTreeMap<String, SourceManifest>,
}

impl GenerationRun {
    /// A run with the built-in dialects.
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_classifiers(config, default_classifiers())
    }

    /// A run with a custom dialect set.
    pub fn with_classifiers(
        config: GeneratorConfig,
        classifiers: Vec<Box<dyn RouteClassifier>>,
    ) -> Self {
        Self {
            config,
            classifiers,
            projects: BTreeMap::new(),
        }
    }

    /// Adds the declarations of `name`; manifests of the same project merge
    /// into one source root.
    pub fn add_project(&mut self, name: &str, manifest: SourceManifest) {
        match self.projects.get_mut(name) {
            Some(existing) => existing.merge(manifest),
            None => {
                self.projects.insert(name.to_string(), manifest);
            }
        }
    }

    /// Adds a manifest under its own project name.
    pub fn add_manifest(&mut self, manifest: SourceManifest) -> AppResult<()> {
        let name = manifest
            .project
            .clone()
            .ok_or_else(|| AppError::General("Source manifest names no project".to_string()))?;
        self.add_project(&name, manifest);
        Ok(())
    }

    /// Project names added so far.
    pub fn project_names(&self) -> Vec<&str> {
        self.projects.keys().map(String::as_str).collect()
    }

    /// Builds every project's document, ordered by project name. Projects
    /// without any path are left out.
    pub fn run(&self) -> AppResult<BTreeMap<String, ApiDocument>> {
        let mut documents = BTreeMap::new();
        for (name, manifest) in &self.projects {
            match build_document(&self.config, &self.classifiers, name, manifest)? {
                Some(document) => {
                    tracing::info!(
                        project = %name,
                        paths = document.paths.len(),
                        operations = document.operation_count(),
                        definitions = document.definitions.len(),
                        "document assembled"
                    );
                    documents.insert(name.clone(), document);
                }
                None => tracing::info!(project = %name, "no routes found, project skipped"),
            }
        }
        Ok(documents)
    }
}

/// Builds one project's document; `None` when no path was classified.
pub fn build_document(
    config: &GeneratorConfig,
    classifiers: &[Box<dyn RouteClassifier>],
    name: &str,
    manifest: &SourceManifest,
) -> AppResult<Option<ApiDocument>> {
    let table = TypeTable::from_manifest(manifest)?;
    let context = ResolverContext::new(config);
    let cx = ClassifyContext {
        resolver: TypeResolver::new(&table, &context),
        config,
    };
    let mut assembler = DocumentAssembler::new(&config.settings_for(name));

    for class in &manifest.classes {
        for classifier in classifiers {
            let Some(tag) = classifier.controller_tag(class) else {
                continue;
            };
            tracing::debug!(class = %class.name, dialect = classifier.dialect(), "controller");
            assembler.add_tag(tag);
            for method in &class.methods {
                if let Some(draft) = classifier.classify(class, method, &cx) {
                    assembler.add_operation(draft);
                }
            }
        }
    }

    if assembler.path_count() == 0 {
        return Ok(None);
    }
    Ok(Some(assembler.finalize(&context)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOP: &str = r#"
project: shop
types:
  com.acme.Item:
    fields:
      - {name: sku, type: String}
classes:
  - name: ItemController
    annotations: [{name: RestController}]
    methods:
      - name: get
        return_type: com.acme.Item
        annotations: [{name: GetMapping, value: "/items/{sku}"}]
  - name: Helper
    methods:
      - name: noop
"#;

    const WAREHOUSE: &str = r#"
project: warehouse
types:
  com.acme.Item:
    fields:
      - {name: shelf, type: int}
classes:
  - name: StockController
    annotations: [{name: RestController}]
    methods:
      - name: count
        return_type: com.acme.Item
        annotations: [{name: GetMapping, value: "/stock"}]
"#;

    #[test]
    fn test_projects_are_isolated() {
        let mut run = GenerationRun::new(GeneratorConfig::default());
        run.add_manifest(SourceManifest::from_yaml(SHOP).unwrap()).unwrap();
        run.add_manifest(SourceManifest::from_yaml(WAREHOUSE).unwrap()).unwrap();
        assert_eq!(run.project_names(), vec!["shop", "warehouse"]);

        let docs = run.run().unwrap();
        let shop = &docs["shop"];
        let warehouse = &docs["warehouse"];
        let shop_item = &shop.definitions["Item"];
        let warehouse_item = &warehouse.definitions["Item"];
        assert_ne!(shop_item, warehouse_item);
        assert_eq!(shop.tags.len(), 1);
        assert_eq!(shop.info.title, "shop");
    }

    #[test]
    fn test_empty_project_is_skipped() {
        let mut run = GenerationRun::new(GeneratorConfig::default());
        run.add_project(
            "empty",
            SourceManifest::from_yaml("classes: [{name: Plain}]").unwrap(),
        );
        assert!(run.run().unwrap().is_empty());
    }

    #[test]
    fn test_manifest_without_project_is_rejected() {
        let mut run = GenerationRun::new(GeneratorConfig::default());
        let err = run.add_manifest(SourceManifest::default()).unwrap_err();
        assert!(matches!(err, AppError::General(_)));
    }
}
