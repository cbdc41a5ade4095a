//! # Document Assembler
//!
//! Folds `OperationDraft`s into a path → verb → operation map and, once every
//! draft is in, attaches the registry definitions and security schemes.

use crate::classify::{OperationDraft, ParameterBinding};
use crate::config::DocumentSettings;
use crate::document::model::{
    ApiDocument, Operation, Parameter, PathItem, Response, SecurityDefinition, Tag,
};
use crate::schema::ResolverContext;
use indexmap::{IndexMap, IndexSet};
use serde_json::{json, Value as JsonValue};

/// Status code of the success response.
pub const SUCCESS_STATUS: &str = "200";

/// Status code of the synthesized failure response.
pub const ERROR_STATUS: &str = "500";

/// Names of the security schemes every operation requires.
pub const SECURITY_SCHEMES: &[&str] = &["api_key", "oauth2", "basic"];

/// Builds one project's `ApiDocument`.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    document: ApiDocument,
}

impl DocumentAssembler {
    /// An empty document carrying the resolved settings.
    pub fn new(settings: &DocumentSettings) -> Self {
        let mut document = ApiDocument::new(settings.title.clone(), settings.version.clone());
        document.info.description = settings.description.clone();
        document.host = settings.host.clone();
        document.base_path = settings.base_path.clone();
        document.schemes = settings.schemes.clone();
        Self { document }
    }

    /// Registers a controller tag; a repeated name keeps the first.
    pub fn add_tag(&mut self, tag: Tag) {
        if self.document.tags.iter().all(|t| t.name != tag.name) {
            self.document.tags.push(tag);
        }
    }

    /// Adds one operation per full path and verb of the draft. A later draft
    /// on the same path and verb replaces the earlier one.
    pub fn add_operation(&mut self, draft: OperationDraft) {
        let operation = build_operation(&draft);
        for path in draft.full_paths() {
            let item = self.document.paths.entry(path.clone()).or_default();
            for verb in &draft.verbs {
                if item.insert(*verb, operation.clone()).is_some() {
                    tracing::warn!(%path, %verb, method = %draft.method_name, "duplicate route replaced");
                } else {
                    tracing::debug!(%path, %verb, method = %draft.method_name, "route registered");
                }
            }
        }
    }

    /// Number of paths collected so far.
    pub fn path_count(&self) -> usize {
        self.document.paths.len()
    }

    /// Sorts paths and tags, prunes unreferenced tags, and attaches the
    /// definitions of `context` plus the security schemes.
    pub fn finalize(self, context: &ResolverContext) -> ApiDocument {
        let mut document = self.document;

        document.paths.sort_keys();
        for item in document.paths.values_mut() {
            item.sort_keys();
        }

        let referenced: IndexSet<&str> = document
            .paths
            .values()
            .flat_map(|item: &PathItem| item.values())
            .flat_map(|op| op.tags.iter().map(String::as_str))
            .collect();
        let mut tags: Vec<Tag> = document
            .tags
            .iter()
            .filter(|t| referenced.contains(t.name.as_str()))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        document.tags = tags;

        document.definitions = context.definitions();
        document.security_definitions = security_definitions();
        document
    }
}

/// The `api_key`, `oauth2` and `basic` schemes.
pub fn security_definitions() -> IndexMap<String, SecurityDefinition> {
    let mut scopes = IndexMap::new();
    scopes.insert("write:pets".to_string(), "modify pets in your account".to_string());
    scopes.insert("read:pets".to_string(), "read your pets".to_string());

    let mut defs = IndexMap::new();
    defs.insert(
        "api_key".to_string(),
        SecurityDefinition::ApiKey {
            name: "Authorization".to_string(),
            location: "header".to_string(),
        },
    );
    defs.insert(
        "oauth2".to_string(),
        SecurityDefinition::OAuth2 {
            flow: "implicit".to_string(),
            authorization_url: Some("http://petstore.swagger.io/oauth/dialog".to_string()),
            token_url: None,
            scopes,
        },
    );
    defs.insert("basic".to_string(), SecurityDefinition::Basic);
    defs
}

fn security_requirement() -> Vec<IndexMap<String, Vec<String>>> {
    let requirement = SECURITY_SCHEMES
        .iter()
        .map(|name| (name.to_string(), Vec::new()))
        .collect();
    vec![requirement]
}

fn to_parameter(binding: &ParameterBinding) -> Parameter {
    Parameter {
        name: binding.name.clone(),
        location: binding.location,
        description: binding.description.clone(),
        required: binding.required,
        schema: binding.schema.clone(),
        default: binding.default.clone().map(JsonValue::String),
    }
}

fn build_operation(draft: &OperationDraft) -> Operation {
    let mut responses = IndexMap::new();
    responses.insert(
        SUCCESS_STATUS.to_string(),
        Response {
            description: draft.return_description.clone().unwrap_or_default(),
            schema: draft.return_schema.clone(),
            ..Default::default()
        },
    );
    if let Some(label) = &draft.error_description {
        responses.insert(
            ERROR_STATUS.to_string(),
            Response {
                description: json!({ "message": label }).to_string(),
                ..Default::default()
            },
        );
    }

    Operation {
        tags: vec![draft.owner_name.clone()],
        summary: draft.summary.clone(),
        description: draft.description.clone(),
        operation_id: Some(draft.method_name.clone()),
        consumes: draft.consumes.clone(),
        produces: draft.produces.clone(),
        parameters: draft.parameters.iter().map(to_parameter).collect(),
        responses,
        security: security_requirement(),
    }
}
