//! # Route Classifier
//!
//! Converts annotated declarations into `OperationDraft`s. One classifier per
//! annotation dialect; the assembler runs every classifier over every class.
//!
//! - **mapping**: `@RequestMapping`-style controllers.
//! - **path**: `@Path`-style resources.
//! - **rpc**: RPC service implementations where every method is routable.

pub mod common;
pub mod mapping;
pub mod path;
pub mod rpc;

use crate::config::GeneratorConfig;
use crate::document::model::{HttpVerb, ParamLocation, Tag};
use crate::frontend::{ClassDecl, MethodDecl};
use crate::schema::{Schema, TypeResolver};
use indexmap::IndexMap;

pub use mapping::MappingDialect;
pub use path::PathDialect;
pub use rpc::RpcDialect;

/// A classified method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBinding {
    /// Binding location.
    pub location: ParamLocation,
    /// External name (after renames).
    pub name: String,
    /// Value schema; non-body structured values are already narrowed to strings.
    pub schema: Schema,
    /// Whether the caller must supply it.
    pub required: bool,
    /// Default value as written.
    pub default: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
}

/// The extraction result of one routable method.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationDraft {
    /// Simple name of the declaring class.
    pub owner_name: String,
    /// Method name.
    pub method_name: String,
    /// Class-level path prefix.
    pub parent_path: Option<String>,
    /// Method-level path suffixes; empty means the parent path alone.
    pub paths: Vec<String>,
    /// HTTP verbs.
    pub verbs: Vec<HttpVerb>,
    /// Accepted media types.
    pub consumes: Vec<String>,
    /// Produced media types.
    pub produces: Vec<String>,
    /// Parameter bindings in declaration order.
    pub parameters: Vec<ParameterBinding>,
    /// Success response schema.
    pub return_schema: Option<Schema>,
    /// Doc comment description.
    pub summary: Option<String>,
    /// `@apiNote` text.
    pub description: Option<String>,
    /// `@return` text.
    pub return_description: Option<String>,
    /// `@throws` label.
    pub error_description: Option<String>,
    /// `@param` texts keyed by declared parameter name.
    pub param_docs: IndexMap<String, String>,
}

impl OperationDraft {
    /// Normalized full path templates.
    pub fn full_paths(&self) -> Vec<String> {
        let parent = self.parent_path.as_deref();
        if self.paths.is_empty() {
            vec![common::join_path(parent, None)]
        } else {
            self.paths
                .iter()
                .map(|p| common::join_path(parent, Some(p)))
                .collect()
        }
    }
}

/// What a classifier can consult while classifying.
#[derive(Clone, Copy)]
pub struct ClassifyContext<'a> {
    /// Resolver bound to the source root's context.
    pub resolver: TypeResolver<'a>,
    /// Generator configuration.
    pub config: &'a GeneratorConfig,
}

/// One annotation dialect.
pub trait RouteClassifier: Send + Sync {
    /// Dialect name for logging.
    fn dialect(&self) -> &'static str;

    /// The tag of a class carrying this dialect's controller marker;
    /// `None` skips the class and all of its methods.
    fn controller_tag(&self, class: &ClassDecl) -> Option<Tag>;

    /// Classifies one method of a marked class; `None` when it is not routable.
    fn classify(
        &self,
        class: &ClassDecl,
        method: &MethodDecl,
        cx: &ClassifyContext<'_>,
    ) -> Option<OperationDraft>;
}

/// All built-in dialects.
pub fn default_classifiers() -> Vec<Box<dyn RouteClassifier>> {
    vec![
        Box::new(MappingDialect),
        Box::new(PathDialect),
        Box::new(RpcDialect),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_paths() {
        let draft = OperationDraft {
            parent_path: Some("/users/".into()),
            paths: vec!["{id}".into(), "/by-name/{name}".into()],
            ..Default::default()
        };
        assert_eq!(draft.full_paths(), vec!["/users/{id}", "/users/by-name/{name}"]);

        let bare = OperationDraft {
            parent_path: Some("orders".into()),
            ..Default::default()
        };
        assert_eq!(bare.full_paths(), vec!["/orders"]);
        assert_eq!(OperationDraft::default().full_paths(), vec!["/"]);
    }

    #[test]
    fn test_default_classifiers() {
        let names: Vec<_> = default_classifiers().iter().map(|c| c.dialect()).collect();
        assert_eq!(names, vec!["mapping", "path", "rpc"]);
    }
}
